//! OBD adapter queries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tpx_protocol::ObdConnection;
use tpx_protocol::timestamp;

use crate::store::StoreError;

/// Adapter row as stored in the database.
///
/// `registered_at` exists only in storage: it is the first `last_seen` and
/// never changes, so listing can follow registration order.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ObdConnectionRow {
    pub id: String,
    pub device_name: String,
    pub device_id: String,
    pub protocol: String,
    pub rssi: i32,
    pub connected: bool,
    pub last_seen: String,
    pub registered_at: String,
}

impl From<&ObdConnection> for ObdConnectionRow {
    fn from(c: &ObdConnection) -> Self {
        Self {
            id: c.id.clone(),
            device_name: c.device_name.clone(),
            device_id: c.device_id.clone(),
            protocol: c.protocol.clone(),
            rssi: c.rssi,
            connected: c.connected,
            last_seen: timestamp::format(c.last_seen),
            registered_at: timestamp::format(c.last_seen),
        }
    }
}

impl TryFrom<ObdConnectionRow> for ObdConnection {
    type Error = StoreError;

    fn try_from(row: ObdConnectionRow) -> Result<Self, Self::Error> {
        let last_seen = timestamp::parse(&row.last_seen)
            .map_err(|e| StoreError::corrupt("obd_connections", e))?;
        Ok(Self {
            id: row.id,
            device_name: row.device_name,
            device_id: row.device_id,
            protocol: row.protocol,
            rssi: row.rssi,
            connected: row.connected,
            last_seen,
        })
    }
}

/// Insert a new adapter.
pub async fn insert(pool: &PgPool, row: &ObdConnectionRow) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO obd_connections (id, device_name, device_id, protocol, rssi, connected, last_seen, registered_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(&row.id)
    .bind(&row.device_name)
    .bind(&row.device_id)
    .bind(&row.protocol)
    .bind(row.rssi)
    .bind(row.connected)
    .bind(&row.last_seen)
    .bind(&row.registered_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// List adapters in registration order.
pub async fn list(pool: &PgPool, limit: i64) -> Result<Vec<ObdConnectionRow>, sqlx::Error> {
    sqlx::query_as::<_, ObdConnectionRow>(
        "SELECT * FROM obd_connections ORDER BY registered_at, id LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Set connectivity and refresh `last_seen`. Returns the number of rows matched.
pub async fn set_connected(
    pool: &PgPool,
    id: &str,
    connected: bool,
    seen_at: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE obd_connections SET connected = $1, last_seen = $2 WHERE id = $3")
        .bind(connected)
        .bind(timestamp::format(seen_at))
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tpx_protocol::NewObdConnection;

    fn adapter() -> ObdConnection {
        NewObdConnection {
            device_name: "OBDLink MX+".into(),
            device_id: "00:04:3E:9A:11:02".into(),
            protocol: "ISO 9141-2".into(),
            rssi: None,
        }
        .into_connection()
    }

    #[test]
    fn registered_at_is_first_sighting() {
        let c = adapter();
        let row = ObdConnectionRow::from(&c);
        assert_eq!(row.registered_at, row.last_seen);
        assert_eq!(ObdConnection::try_from(row).unwrap(), c);
    }

    #[test]
    fn later_registration_sorts_after_earlier() {
        let first = adapter();
        let mut second = adapter();
        second.last_seen = first.last_seen + chrono::Duration::microseconds(1);
        assert!(
            ObdConnectionRow::from(&first).registered_at
                < ObdConnectionRow::from(&second).registered_at
        );
    }

    #[test]
    fn unparseable_last_seen_is_corrupt() {
        let mut row = ObdConnectionRow::from(&adapter());
        row.last_seen = "never".into();
        assert!(matches!(
            ObdConnection::try_from(row),
            Err(StoreError::Corrupt { collection: "obd_connections", .. })
        ));
    }
}
