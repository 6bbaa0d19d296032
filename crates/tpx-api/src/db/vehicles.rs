//! Vehicle registry queries.

use sqlx::PgPool;

use tpx_protocol::Vehicle;
use tpx_protocol::timestamp;

use crate::store::StoreError;

/// Vehicle row as stored in the database.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct VehicleRow {
    pub id: String,
    pub vin: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub ecu_id: Option<String>,
    pub protocol: String,
    pub battery_voltage: f64,
    pub created_at: String,
}

impl From<&Vehicle> for VehicleRow {
    fn from(v: &Vehicle) -> Self {
        Self {
            id: v.id.clone(),
            vin: v.vin.clone(),
            make: v.make.clone(),
            model: v.model.clone(),
            year: v.year,
            ecu_id: v.ecu_id.clone(),
            protocol: v.protocol.clone(),
            battery_voltage: v.battery_voltage,
            created_at: timestamp::format(v.created_at),
        }
    }
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = StoreError;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        let created_at =
            timestamp::parse(&row.created_at).map_err(|e| StoreError::corrupt("vehicles", e))?;
        Ok(Self {
            id: row.id,
            vin: row.vin,
            make: row.make,
            model: row.model,
            year: row.year,
            ecu_id: row.ecu_id,
            protocol: row.protocol,
            battery_voltage: row.battery_voltage,
            created_at,
        })
    }
}

/// Insert a new vehicle.
pub async fn insert(pool: &PgPool, row: &VehicleRow) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO vehicles (id, vin, make, model, year, ecu_id, protocol, battery_voltage, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(&row.id)
    .bind(&row.vin)
    .bind(&row.make)
    .bind(&row.model)
    .bind(row.year)
    .bind(&row.ecu_id)
    .bind(&row.protocol)
    .bind(row.battery_voltage)
    .bind(&row.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// List vehicles in registration order.
pub async fn list(pool: &PgPool, limit: i64) -> Result<Vec<VehicleRow>, sqlx::Error> {
    sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles ORDER BY created_at, id LIMIT $1")
        .bind(limit)
        .fetch_all(pool)
        .await
}

/// Get a vehicle by ID.
pub async fn get_by_id(pool: &PgPool, id: &str) -> Result<Option<VehicleRow>, sqlx::Error> {
    sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tpx_protocol::NewVehicle;

    fn vehicle() -> Vehicle {
        NewVehicle {
            vin: "1HGCM82633A004352".into(),
            make: "Honda".into(),
            model: "Accord".into(),
            year: 2003,
            ecu_id: None,
            protocol: None,
            battery_voltage: None,
        }
        .into_vehicle()
    }

    #[test]
    fn row_conversion_preserves_record() {
        let v = vehicle();
        let row = VehicleRow::from(&v);
        assert!(row.created_at.ends_with('Z'));
        assert_eq!(Vehicle::try_from(row).unwrap(), v);
    }

    #[test]
    fn unparseable_timestamp_is_corrupt() {
        let mut row = VehicleRow::from(&vehicle());
        row.created_at = "not a time".into();
        let err = Vehicle::try_from(row).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { collection: "vehicles", .. }));
    }
}
