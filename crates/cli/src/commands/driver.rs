//! Driver management commands.

use std::io::Write as _;

use tracing::{info, warn};

use terra_verde_admin::db::DriverRepository;
use terra_verde_admin::models::NewDriver;
use terra_verde_admin::services::IdentityService;
use terra_verde_admin::watch::ChangeHub;
use terra_verde_core::VehicleType;

use super::CommandError;

/// Register a delivery driver: provision the login account, then insert the
/// driver row. A failed driver insert leaves the account orphaned, matching
/// the service's behavior.
///
/// # Errors
///
/// Returns an error for an invalid vehicle type, rejected credentials, or a
/// failed write.
pub async fn create(
    email: &str,
    name: &str,
    vehicle: &str,
    password: Option<&str>,
) -> Result<(), CommandError> {
    let vehicle_type: VehicleType = vehicle
        .parse()
        .map_err(CommandError::InvalidArgument)?;

    let password = match password {
        Some(p) => p.to_string(),
        None => prompt_password()?,
    };

    let pool = super::connect().await?;
    let hub = ChangeHub::new();
    let identity = IdentityService::new(pool.clone());

    let account_id = identity.provision(email, &password).await?;
    info!(%account_id, "driver account provisioned");

    let input = NewDriver {
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
        vehicle_type,
        password,
    };

    let driver = DriverRepository::new(&pool, &hub)
        .create(&input, account_id)
        .await
        .inspect_err(|_| {
            warn!(%account_id, "driver insert failed; account is orphaned");
        })?;

    info!(driver_id = %driver.id, "driver registered");
    Ok(())
}

/// Read a password from stdin.
fn prompt_password() -> Result<String, CommandError> {
    #[allow(clippy::print_stdout)]
    {
        print!("Password: ");
    }
    std::io::stdout()
        .flush()
        .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;

    let mut password = String::new();
    std::io::stdin()
        .read_line(&mut password)
        .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;

    Ok(password.trim_end_matches(['\n', '\r']).to_string())
}
