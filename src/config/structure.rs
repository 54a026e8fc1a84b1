//! Configuration structure
// (c) 2024 Ross Younger

use serde::Serialize;

use super::fields::{parse_u32, string_field, typed_field, Field};

/// Placeholder owner tag shipped in the template; replaced by the current user at load time.
pub const OWNER_PLACEHOLDER: &str = "your-name";

/// The set of configurable options supported by ec2ctl.
///
/// Field names are the fully-qualified keys used in the configuration file:
/// `aws_region` is `region` inside the `aws:` section.
///
/// **Note:** `Configuration::default()` is an empty record.
/// Hard-wired defaults live in the field table and are obtained via [`Configuration::builtin`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Configuration {
    // AWS ==============================================================================
    /// Named credentials profile passed to the provider CLI
    pub aws_profile: String,
    /// Region passed to the provider CLI
    pub aws_region: String,

    // SSH ==============================================================================
    /// Private key used to reach instances
    pub ssh_key_path: String,
    /// Directory holding per-instance key pairs
    pub ssh_key_dir: String,
    /// Login user when a preset doesn't name one
    pub ssh_default_user: String,

    // BASTION ==========================================================================
    /// Jump host. Empty means connect directly.
    pub bastion_host: String,
    /// Login user on the jump host
    pub bastion_user: String,
    /// Private key for the jump host
    pub bastion_key: String,

    // NETWORK ==========================================================================
    /// Security group applied to launched instances
    pub network_security_group_id: String,
    /// Subnet to launch into
    pub network_subnet_id: String,

    // TAGS =============================================================================
    /// Owner tag. Defaults to the invoking user.
    pub tags_owner: String,
    /// Project tag
    pub tags_project: String,
    /// Environment tag
    pub tags_environment: String,

    // DEFAULTS =========================================================================
    /// Lifetime hint for new instances, in hours
    pub defaults_ttl_hours: u32,
    /// Root volume type
    pub defaults_volume_type: String,

    // AMI ==============================================================================
    /// Amazon Linux image; empty means look up the latest
    pub ami_amazon_linux: String,
    /// Ubuntu image; empty means look up the latest
    pub ami_ubuntu: String,
}

pub(crate) const FIELDS: &[Field<Configuration>] = &[
    string_field!(
        Some("aws"),
        "profile",
        aws_profile,
        "default",
        EmptyIsAbsent,
        "Named credentials profile passed to the provider CLI"
    ),
    string_field!(
        Some("aws"),
        "region",
        aws_region,
        "us-east-1",
        EmptyIsAbsent,
        "Region passed to the provider CLI"
    ),
    string_field!(
        Some("ssh"),
        "key_path",
        ssh_key_path,
        "~/.ssh/id_rsa",
        EmptyIsValue,
        "Private key used to reach instances"
    ),
    string_field!(
        Some("ssh"),
        "key_dir",
        ssh_key_dir,
        "~/.ssh",
        EmptyIsValue,
        "Directory holding per-instance key pairs"
    ),
    string_field!(
        Some("ssh"),
        "default_user",
        ssh_default_user,
        "ec2-user",
        EmptyIsAbsent,
        "Login user when a preset doesn't name one"
    ),
    string_field!(
        Some("bastion"),
        "host",
        bastion_host,
        "",
        EmptyIsValue,
        "Jump host (leave empty to connect directly)"
    ),
    string_field!(
        Some("bastion"),
        "user",
        bastion_user,
        "",
        EmptyIsValue,
        "Login user on the jump host"
    ),
    string_field!(
        Some("bastion"),
        "key",
        bastion_key,
        "",
        EmptyIsValue,
        "Private key for the jump host"
    ),
    string_field!(
        Some("network"),
        "security_group_id",
        network_security_group_id,
        "",
        EmptyIsValue,
        "Security group applied to launched instances"
    ),
    string_field!(
        Some("network"),
        "subnet_id",
        network_subnet_id,
        "",
        EmptyIsValue,
        "Subnet to launch into"
    ),
    string_field!(
        Some("tags"),
        "owner",
        tags_owner,
        "",
        EmptyIsValue,
        "Owner tag (defaults to your login name)"
    ),
    string_field!(
        Some("tags"),
        "project",
        tags_project,
        "",
        EmptyIsValue,
        "Project tag"
    ),
    string_field!(
        Some("tags"),
        "environment",
        tags_environment,
        "dev",
        EmptyIsValue,
        "Environment tag"
    ),
    typed_field!(
        Some("defaults"),
        "ttl_hours",
        defaults_ttl_hours,
        "8",
        parse_u32,
        "Lifetime hint for new instances, in hours"
    ),
    string_field!(
        Some("defaults"),
        "volume_type",
        defaults_volume_type,
        "gp3",
        EmptyIsAbsent,
        "Root volume type"
    ),
    string_field!(
        Some("ami"),
        "amazon_linux",
        ami_amazon_linux,
        "",
        EmptyIsValue,
        "Amazon Linux image id (empty: look up the latest)"
    ),
    string_field!(
        Some("ami"),
        "ubuntu",
        ami_ubuntu,
        "",
        EmptyIsValue,
        "Ubuntu image id (empty: look up the latest)"
    ),
];

impl Configuration {
    /// Returns ec2ctl's hard-wired configuration defaults.
    ///
    /// The owner tag is left empty here; the loader fills it in from the current user.
    #[must_use]
    pub fn builtin() -> Self {
        let mut config = Self::default();
        for field in FIELDS {
            // The defaults are checked by unit test
            let _ = (field.assign)(&mut config, field.default);
        }
        config
    }

    /// Is the owner tag unset or still the template placeholder?
    #[must_use]
    pub fn owner_needs_identity(&self) -> bool {
        self.tags_owner.is_empty() || self.tags_owner == OWNER_PLACEHOLDER
    }

    /// The list of fully-qualified keys this structure understands, in table order
    #[must_use]
    pub fn keys() -> impl Iterator<Item = String> {
        FIELDS.iter().map(|f| f.key().into_owned())
    }

    /// Looks up a field's value by fully-qualified key, formatted for display
    #[must_use]
    pub fn value_of(&self, key: &str) -> Option<String> {
        FIELDS
            .iter()
            .find(|f| f.key() == key)
            .map(|f| (f.read)(self))
    }

    /// Renders a commented configuration file holding the built-in defaults
    #[must_use]
    pub fn template() -> String {
        format!(
            "# ec2ctl configuration\n\
             #\n\
             # One level of sections; values may be quoted. Lines starting with # are comments.\n\
             # Missing keys take the defaults shown here.\n\
             {}",
            super::fields::template(FIELDS, &[("tags_owner", OWNER_PLACEHOLDER)])
        )
    }
}
