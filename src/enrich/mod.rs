//! Email inference for listings without a published address
//!
//! A trusted domain is derived from the record (website, then email, then
//! optionally the company name) and turned into role addresses such as
//! `info@` and `contacto@`. The optional website lookup fetches the
//! listing's own site looking for a real address first.

mod domain;
mod lookup;
mod roles;

pub use domain::{infer_domain, name_slug, DomainStrategy};
pub use lookup::WebsiteEmailLookup;
pub use roles::{enrich_record, synthesize_role_emails, RoleEmails};
