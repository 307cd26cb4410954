use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::equipment::dtos::{
    EquipmentListQuery, EquipmentResponseDto, EquipmentStatisticsDto,
};
use crate::features::equipment::models::{Equipment, EquipmentFields, EquipmentStatus};
use crate::shared::expiration::ExpirationClassifier;
use crate::shared::query::{like_pattern, normalize_filter};

const EQUIPMENT_COLUMNS: &str = "id, code, equipment_type, sector, operational_status, \
     manufacturer, model, serial_number, measurement_range, location, \
     last_calibration_date, next_calibration_date, created_by, created_at, updated_at";

/// Optional list filters, bound as $1..$6
const EQUIPMENT_FILTERS: &str = r#"
    ($1::text IS NULL OR code ILIKE $1 OR equipment_type ILIKE $1 OR serial_number ILIKE $1)
    AND ($2::text IS NULL OR sector = $2)
    AND ($3::text IS NULL OR equipment_type = $3)
    AND ($4::equipment_status IS NULL OR operational_status = $4)
    AND ($5::date IS NULL OR next_calibration_date >= $5)
    AND ($6::date IS NULL OR next_calibration_date <= $6)
"#;

const DUPLICATE_CODE: &str = "Equipment with this code already exists";

/// Service for the measuring equipment registry
pub struct EquipmentService {
    pool: PgPool,
}

impl EquipmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List equipment by next calibration date, filtered and annotated with its status
    pub async fn list(
        &self,
        query: &EquipmentListQuery,
        classifier: &ExpirationClassifier,
    ) -> Result<(Vec<EquipmentResponseDto>, i64)> {
        let page = query.pagination();
        let search = like_pattern(query.search.as_deref());
        let sector = normalize_filter(query.sector.as_deref());
        let equipment_type = normalize_filter(query.equipment_type.as_deref());
        let (from, to) = classifier.bounds(query.status, query.due_from, query.due_to);

        let count_sql = format!("SELECT COUNT(*) FROM equipment WHERE {}", EQUIPMENT_FILTERS);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&search)
            .bind(&sector)
            .bind(&equipment_type)
            .bind(query.operational_status)
            .bind(from)
            .bind(to)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count equipment: {:?}", e);
                AppError::Database(e)
            })?;

        let list_sql = format!(
            "SELECT {} FROM equipment WHERE {} \
             ORDER BY next_calibration_date, code OFFSET $7 LIMIT $8",
            EQUIPMENT_COLUMNS, EQUIPMENT_FILTERS
        );
        let rows = sqlx::query_as::<_, Equipment>(&list_sql)
            .bind(&search)
            .bind(&sector)
            .bind(&equipment_type)
            .bind(query.operational_status)
            .bind(from)
            .bind(to)
            .bind(page.offset())
            .bind(page.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list equipment: {:?}", e);
                AppError::Database(e)
            })?;

        let items = rows
            .into_iter()
            .map(|e| EquipmentResponseDto::from_model(e, classifier))
            .collect();

        Ok((items, total))
    }

    pub async fn get(
        &self,
        id: Uuid,
        classifier: &ExpirationClassifier,
    ) -> Result<EquipmentResponseDto> {
        let sql = format!("SELECT {} FROM equipment WHERE id = $1", EQUIPMENT_COLUMNS);
        let equipment = sqlx::query_as::<_, Equipment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get equipment: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))?;

        Ok(EquipmentResponseDto::from_model(equipment, classifier))
    }

    pub async fn create(
        &self,
        fields: &EquipmentFields,
        created_by: &str,
        classifier: &ExpirationClassifier,
    ) -> Result<EquipmentResponseDto> {
        let sql = format!(
            r#"
            INSERT INTO equipment
                (code, equipment_type, sector, operational_status, manufacturer, model,
                 serial_number, measurement_range, location, last_calibration_date,
                 next_calibration_date, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            EQUIPMENT_COLUMNS
        );
        let equipment = sqlx::query_as::<_, Equipment>(&sql)
            .bind(&fields.code)
            .bind(&fields.equipment_type)
            .bind(&fields.sector)
            .bind(fields.operational_status)
            .bind(&fields.manufacturer)
            .bind(&fields.model)
            .bind(&fields.serial_number)
            .bind(&fields.measurement_range)
            .bind(&fields.location)
            .bind(fields.last_calibration_date)
            .bind(fields.next_calibration_date)
            .bind(created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create equipment: {:?}", e);
                AppError::from_db(e, DUPLICATE_CODE)
            })?;

        tracing::info!("Registered equipment {} ({})", equipment.id, equipment.code);
        Ok(EquipmentResponseDto::from_model(equipment, classifier))
    }

    /// Replace every field of an equipment record
    pub async fn update(
        &self,
        id: Uuid,
        fields: &EquipmentFields,
        classifier: &ExpirationClassifier,
    ) -> Result<EquipmentResponseDto> {
        let sql = format!(
            r#"
            UPDATE equipment
            SET code = $2, equipment_type = $3, sector = $4, operational_status = $5,
                manufacturer = $6, model = $7, serial_number = $8, measurement_range = $9,
                location = $10, last_calibration_date = $11, next_calibration_date = $12,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            EQUIPMENT_COLUMNS
        );
        let equipment = sqlx::query_as::<_, Equipment>(&sql)
            .bind(id)
            .bind(&fields.code)
            .bind(&fields.equipment_type)
            .bind(&fields.sector)
            .bind(fields.operational_status)
            .bind(&fields.manufacturer)
            .bind(&fields.model)
            .bind(&fields.serial_number)
            .bind(&fields.measurement_range)
            .bind(&fields.location)
            .bind(fields.last_calibration_date)
            .bind(fields.next_calibration_date)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update equipment: {:?}", e);
                AppError::from_db(e, DUPLICATE_CODE)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))?;

        tracing::info!("Updated equipment {}", equipment.id);
        Ok(EquipmentResponseDto::from_model(equipment, classifier))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete equipment: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }

        tracing::info!("Deleted equipment {}", id);
        Ok(())
    }

    /// Calibration counts over equipment in service; discarded equipment is
    /// counted apart
    pub async fn statistics(
        &self,
        classifier: &ExpirationClassifier,
    ) -> Result<EquipmentStatisticsDto> {
        let rows: Vec<(NaiveDate, EquipmentStatus)> =
            sqlx::query_as("SELECT next_calibration_date, operational_status FROM equipment")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to load equipment calibration dates: {:?}", e);
                    AppError::Database(e)
                })?;

        let (discarded, in_service): (Vec<_>, Vec<_>) = rows
            .into_iter()
            .partition(|(_, status)| *status == EquipmentStatus::Discarded);
        let dates: Vec<NaiveDate> = in_service.into_iter().map(|(date, _)| date).collect();

        let sectors: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT sector FROM equipment ORDER BY sector")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to list equipment sectors: {:?}", e);
                    AppError::Database(e)
                })?;

        let equipment_types: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT equipment_type FROM equipment ORDER BY equipment_type",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list equipment types: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(EquipmentStatisticsDto {
            summary: classifier.summarize(&dates),
            discarded: discarded.len() as i64,
            sector_count: sectors.len(),
            sectors,
            equipment_types,
        })
    }
}
