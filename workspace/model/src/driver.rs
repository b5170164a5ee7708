use crate::entities::{account, driver};
use crate::password;
use common::{DriverDto, Searchable};
use std::fmt;

/// A driver: a generic account composed with the driver-only attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Driver {
    pub account: account::Model,
    pub license_number: String,
}

impl Driver {
    /// Builds a driver from an account row and its optional extension row.
    /// An account without an extension row has an empty license number.
    pub fn from_parts(account: account::Model, profile: Option<driver::Model>) -> Self {
        let license_number = profile.map(|p| p.license_number).unwrap_or_default();
        Self {
            account,
            license_number,
        }
    }

    pub fn id(&self) -> i32 {
        self.account.id
    }

    pub fn username(&self) -> &str {
        &self.account.username
    }

    /// Canonical path of this driver's detail page.
    pub fn absolute_url(&self) -> String {
        format!("/drivers/{}/", self.account.id)
    }

    /// Verifies a plaintext password against the stored hash.
    pub fn check_password(&self, raw: &str) -> bool {
        password::check_password(raw, &self.account.password)
    }

    pub fn has_usable_password(&self) -> bool {
        password::is_password_usable(&self.account.password)
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} {})",
            self.account.username, self.account.first_name, self.account.last_name
        )
    }
}

impl Searchable for Driver {
    const QUERY_PARAM: &'static str = "username";

    fn search_field(&self) -> &str {
        &self.account.username
    }
}

impl From<Driver> for DriverDto {
    fn from(driver: Driver) -> Self {
        let url = driver.absolute_url();
        Self {
            id: driver.account.id,
            username: driver.account.username,
            first_name: driver.account.first_name,
            last_name: driver.account.last_name,
            email: driver.account.email,
            license_number: driver.license_number,
            is_staff: driver.account.is_staff,
            url,
        }
    }
}
