use crate::config::{EnrichmentConfig, RolePrefixes};
use crate::enrich::{infer_domain, DomainStrategy};
use crate::extract::{Field, ListingRecord};

/// Probable role addresses for a domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleEmails {
    pub info: String,
    pub contact: String,
    pub admin: String,
}

/// Builds `<prefix>@<domain>` for each configured role
///
/// # Examples
///
/// ```
/// use listing_harvester::config::RolePrefixes;
/// use listing_harvester::enrich::synthesize_role_emails;
///
/// let emails = synthesize_role_emails("acme.example", &RolePrefixes::default());
/// assert_eq!(emails.info, "info@acme.example");
/// assert_eq!(emails.contact, "contacto@acme.example");
/// assert_eq!(emails.admin, "administracion@acme.example");
/// ```
pub fn synthesize_role_emails(domain: &str, prefixes: &RolePrefixes) -> RoleEmails {
    RoleEmails {
        info: format!("{}@{}", prefixes.info, domain),
        contact: format!("{}@{}", prefixes.contact, domain),
        admin: format!("{}@{}", prefixes.admin, domain),
    }
}

/// Fills the inferred email fields of a record that has no real email
///
/// Records with an email, or for which no domain can be derived, are left
/// untouched.
///
/// # Returns
///
/// `true` if inferred addresses were written
pub fn enrich_record(record: &mut ListingRecord, config: &EnrichmentConfig) -> bool {
    if record.email.is_available() {
        return false;
    }

    let strategy = DomainStrategy::from(config);
    let Some(domain) = infer_domain(record, &strategy) else {
        return false;
    };

    let emails = synthesize_role_emails(&domain, &config.role_prefixes);
    record.inferred_email_info = Field::from_raw(&emails.info);
    record.inferred_email_contact = Field::from_raw(&emails.contact);
    record.inferred_email_admin = Field::from_raw(&emails.admin);
    true
}
