//! SurrealDB schema initialization for the deployment registry
//!
//! Safe to call multiple times (idempotent).

use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::Result;

/// Initialize the registry tables in SurrealDB.
pub async fn init_schema(db: &Surreal<Any>) -> Result<()> {
    info!("Initializing chainsmith registry schema");
    init_deployments_table(db).await?;
    Ok(())
}

/// Initialize the `deployments` table.
///
/// Schema:
/// ```text
/// TABLE deployments {
///   name:            STRING (primary key, unique)
///   address:         STRING (0x-prefixed hex)
///   artifact:        STRING
///   proxy_kind:      STRING? (uups | transparent)
///   proxy_admin:     STRING?
///   implementation:  STRING?
///   created_at:      DATETIME
/// }
/// ```
///
/// Constraints:
/// - `name` is unique: the registry is write-once per logical name. The
///   unique index is the last line of defense against two orchestrator
///   processes racing on the same registry; the write-once check itself is
///   enforced in application logic.
async fn init_deployments_table(db: &Surreal<Any>) -> Result<()> {
    debug!("Initializing deployments table");

    let sql = r#"
        DEFINE TABLE deployments
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR select FULL
                FOR update NONE
                FOR delete NONE;

        -- Registry is keyed by logical component name
        DEFINE INDEX idx_deployment_name ON TABLE deployments COLUMNS name UNIQUE;

        -- Reverse lookup: which name holds this address
        DEFINE INDEX idx_deployment_address ON TABLE deployments COLUMNS address;
    "#;

    db.query(sql).await?;
    info!("✓ deployments table initialized");
    Ok(())
}
