use chrono::NaiveDate;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::emergency_sheets::dtos::{
    EmergencySheetListQuery, EmergencySheetResponseDto, EmergencySheetStatisticsDto,
};
use crate::features::emergency_sheets::models::{EmergencySheet, EmergencySheetFields};
use crate::features::files::dtos::DocumentFolder;
use crate::features::files::{FileService, UploadedFile};
use crate::shared::expiration::ExpirationClassifier;
use crate::shared::query::{like_pattern, normalize_filter};
use crate::shared::validation::normalize_un_number;

const SHEET_COLUMNS: &str = "id, name, product, un_number, risk_class, sector, \
     expiration_date, file_key, file_url, created_by, created_at, updated_at";

/// Optional list filters, bound as $1..$7
const SHEET_FILTERS: &str = r#"
    ($1::text IS NULL OR name ILIKE $1)
    AND ($2::text IS NULL OR product ILIKE $2)
    AND ($3::text IS NULL OR un_number = $3)
    AND ($4::text IS NULL OR risk_class = $4)
    AND ($5::text IS NULL OR sector = $5)
    AND ($6::date IS NULL OR expiration_date >= $6)
    AND ($7::date IS NULL OR expiration_date <= $7)
"#;

/// Service for emergency sheets
pub struct EmergencySheetService {
    pool: PgPool,
    files: Arc<FileService>,
}

impl EmergencySheetService {
    pub fn new(pool: PgPool, files: Arc<FileService>) -> Self {
        Self { pool, files }
    }

    /// List sheets newest first, filtered and annotated with their status
    pub async fn list(
        &self,
        query: &EmergencySheetListQuery,
        classifier: &ExpirationClassifier,
    ) -> Result<(Vec<EmergencySheetResponseDto>, i64)> {
        let page = query.pagination();
        let name = like_pattern(query.name.as_deref());
        let product = like_pattern(query.product.as_deref());
        let un_number = normalize_filter(query.un_number.as_deref())
            .map(|raw| normalize_un_number(&raw).unwrap_or(raw));
        let risk_class = normalize_filter(query.risk_class.as_deref());
        let sector = normalize_filter(query.sector.as_deref());
        let (from, to) = classifier.bounds(query.status, query.expires_from, query.expires_to);

        let count_sql = format!("SELECT COUNT(*) FROM emergency_sheets WHERE {}", SHEET_FILTERS);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&name)
            .bind(&product)
            .bind(&un_number)
            .bind(&risk_class)
            .bind(&sector)
            .bind(from)
            .bind(to)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count emergency sheets: {:?}", e);
                AppError::Database(e)
            })?;

        let list_sql = format!(
            "SELECT {} FROM emergency_sheets WHERE {} ORDER BY created_at DESC OFFSET $8 LIMIT $9",
            SHEET_COLUMNS, SHEET_FILTERS
        );
        let rows = sqlx::query_as::<_, EmergencySheet>(&list_sql)
            .bind(&name)
            .bind(&product)
            .bind(&un_number)
            .bind(&risk_class)
            .bind(&sector)
            .bind(from)
            .bind(to)
            .bind(page.offset())
            .bind(page.limit())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list emergency sheets: {:?}", e);
                AppError::Database(e)
            })?;

        let items = rows
            .into_iter()
            .map(|s| EmergencySheetResponseDto::from_model(s, classifier))
            .collect();

        Ok((items, total))
    }

    async fn find(&self, id: Uuid) -> Result<EmergencySheet> {
        let sql = format!("SELECT {} FROM emergency_sheets WHERE id = $1", SHEET_COLUMNS);
        sqlx::query_as::<_, EmergencySheet>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get emergency sheet: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Emergency sheet {} not found", id)))
    }

    pub async fn get(
        &self,
        id: Uuid,
        classifier: &ExpirationClassifier,
    ) -> Result<EmergencySheetResponseDto> {
        let sheet = self.find(id).await?;
        Ok(EmergencySheetResponseDto::from_model(sheet, classifier))
    }

    /// Store the sheet file, then insert the row. The file is removed again
    /// when the insert fails.
    pub async fn create(
        &self,
        fields: EmergencySheetFields,
        file: UploadedFile,
        created_by: &str,
        classifier: &ExpirationClassifier,
    ) -> Result<EmergencySheetResponseDto> {
        let stored = self.files.store(DocumentFolder::EmergencySheets, file).await?;

        let sql = format!(
            r#"
            INSERT INTO emergency_sheets
                (name, product, un_number, risk_class, sector, expiration_date,
                 file_key, file_url, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            SHEET_COLUMNS
        );
        let result = sqlx::query_as::<_, EmergencySheet>(&sql)
            .bind(&fields.name)
            .bind(&fields.product)
            .bind(&fields.un_number)
            .bind(&fields.risk_class)
            .bind(&fields.sector)
            .bind(fields.expiration_date)
            .bind(&stored.key)
            .bind(&stored.url)
            .bind(created_by)
            .fetch_one(&self.pool)
            .await;

        let sheet = match result {
            Ok(sheet) => sheet,
            Err(e) => {
                tracing::error!("Failed to create emergency sheet: {:?}", e);
                self.files.remove_best_effort(Some(&stored.key)).await;
                return Err(AppError::Database(e));
            }
        };

        tracing::info!("Created emergency sheet {} ({})", sheet.id, sheet.name);
        Ok(EmergencySheetResponseDto::from_model(sheet, classifier))
    }

    /// Replace every field; a new file replaces the stored one
    pub async fn update(
        &self,
        id: Uuid,
        fields: EmergencySheetFields,
        file: Option<UploadedFile>,
        classifier: &ExpirationClassifier,
    ) -> Result<EmergencySheetResponseDto> {
        let current = self.find(id).await?;

        let replacement = match file {
            Some(file) => Some(
                self.files
                    .store(DocumentFolder::EmergencySheets, file)
                    .await?,
            ),
            None => None,
        };
        let (file_key, file_url) = match replacement {
            Some(ref stored) => (Some(stored.key.clone()), Some(stored.url.clone())),
            None => (current.file_key.clone(), current.file_url.clone()),
        };

        let sql = format!(
            r#"
            UPDATE emergency_sheets
            SET name = $2, product = $3, un_number = $4, risk_class = $5, sector = $6,
                expiration_date = $7, file_key = $8, file_url = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SHEET_COLUMNS
        );
        let result = sqlx::query_as::<_, EmergencySheet>(&sql)
            .bind(id)
            .bind(&fields.name)
            .bind(&fields.product)
            .bind(&fields.un_number)
            .bind(&fields.risk_class)
            .bind(&fields.sector)
            .bind(fields.expiration_date)
            .bind(&file_key)
            .bind(&file_url)
            .fetch_optional(&self.pool)
            .await;

        let new_key = replacement.as_ref().map(|s| s.key.as_str());
        let updated = match result {
            Ok(Some(sheet)) => sheet,
            Ok(None) => {
                self.files.remove_best_effort(new_key).await;
                return Err(AppError::NotFound(format!(
                    "Emergency sheet {} not found",
                    id
                )));
            }
            Err(e) => {
                tracing::error!("Failed to update emergency sheet: {:?}", e);
                self.files.remove_best_effort(new_key).await;
                return Err(AppError::Database(e));
            }
        };

        if replacement.is_some() {
            self.files
                .remove_best_effort(current.file_key.as_deref())
                .await;
        }

        tracing::info!("Updated emergency sheet {}", updated.id);
        Ok(EmergencySheetResponseDto::from_model(updated, classifier))
    }

    /// Delete the row, then its file
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let file_key: Option<Option<String>> =
            sqlx::query_scalar("DELETE FROM emergency_sheets WHERE id = $1 RETURNING file_key")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to delete emergency sheet: {:?}", e);
                    AppError::Database(e)
                })?;

        let file_key = file_key
            .ok_or_else(|| AppError::NotFound(format!("Emergency sheet {} not found", id)))?;
        self.files.remove_best_effort(file_key.as_deref()).await;

        tracing::info!("Deleted emergency sheet {}", id);
        Ok(())
    }

    pub async fn statistics(
        &self,
        classifier: &ExpirationClassifier,
    ) -> Result<EmergencySheetStatisticsDto> {
        let dates: Vec<NaiveDate> =
            sqlx::query_scalar("SELECT expiration_date FROM emergency_sheets")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to load emergency sheet expiration dates: {:?}", e);
                    AppError::Database(e)
                })?;

        let sectors = self.distinct("sector").await?;
        let risk_classes = self.distinct("risk_class").await?;

        Ok(EmergencySheetStatisticsDto {
            summary: classifier.summarize(&dates),
            sector_count: sectors.len(),
            risk_class_count: risk_classes.len(),
            sectors,
            risk_classes,
        })
    }

    async fn distinct(&self, column: &'static str) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT {0} FROM emergency_sheets WHERE {0} IS NOT NULL AND {0} <> '' ORDER BY {0}",
            column
        );
        sqlx::query_scalar(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list distinct emergency sheet {}: {:?}", column, e);
                AppError::Database(e)
            })
    }
}
