use anyhow::{Context, Result};
use model::store::{self, NewDriver};
use sea_orm::Database;
use tracing::{debug, error, info, trace};

pub async fn create_superuser(
    database_url: &str,
    username: &str,
    password: &str,
    email: &str,
) -> Result<()> {
    trace!("Entering create_superuser function");
    debug!("Database URL: {}", database_url);

    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;

    let new = NewDriver::new(username).password(password).email(email);
    match store::create_superuser(&db, new).await {
        Ok(admin) => {
            info!("Superuser '{}' created with ID {}", admin.username(), admin.id());
            Ok(())
        }
        Err(e) => {
            error!("Failed to create superuser '{}': {}", username, e);
            Err(e).context("Could not create superuser")
        }
    }
}
