use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::certificates::{dtos as certificates_dtos, handlers as certificates_handlers};
use crate::features::dashboard::{dtos as dashboard_dtos, handlers as dashboard_handlers};
use crate::features::emergency_sheets::{
    dtos as emergency_sheets_dtos, handlers as emergency_sheets_handlers,
};
use crate::features::equipment::{
    dtos as equipment_dtos, handlers as equipment_handlers, models as equipment_models,
};
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::features::fispqs::{dtos as fispqs_dtos, handlers as fispqs_handlers};
use crate::features::public::{dto as public_dtos, handler as public_handlers};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers};
use crate::shared::expiration::{ExpirationStatus, StatusSummary};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handler::get_me,
        // Users
        users_handlers::get_my_profile,
        users_handlers::list_users,
        users_handlers::get_user,
        users_handlers::create_user,
        users_handlers::update_user,
        users_handlers::delete_user,
        // Files
        files_handlers::upload_file,
        files_handlers::view_file,
        // FISPQs
        fispqs_handlers::list_fispqs,
        fispqs_handlers::get_fispq,
        fispqs_handlers::create_fispq,
        fispqs_handlers::update_fispq,
        fispqs_handlers::delete_fispq,
        fispqs_handlers::get_fispq_statistics,
        fispqs_handlers::import_fispqs,
        // Emergency sheets
        emergency_sheets_handlers::list_emergency_sheets,
        emergency_sheets_handlers::get_emergency_sheet,
        emergency_sheets_handlers::create_emergency_sheet,
        emergency_sheets_handlers::update_emergency_sheet,
        emergency_sheets_handlers::delete_emergency_sheet,
        emergency_sheets_handlers::get_emergency_sheet_statistics,
        // Certificates
        certificates_handlers::list_certificates,
        certificates_handlers::get_certificate,
        certificates_handlers::create_certificate,
        certificates_handlers::update_certificate,
        certificates_handlers::delete_certificate,
        certificates_handlers::get_certificate_statistics,
        certificates_handlers::get_next_certificate_number,
        // Equipment
        equipment_handlers::list_equipment,
        equipment_handlers::get_equipment,
        equipment_handlers::create_equipment,
        equipment_handlers::update_equipment,
        equipment_handlers::delete_equipment,
        equipment_handlers::get_equipment_statistics,
        // Dashboard
        dashboard_handlers::get_admin_dashboard,
        dashboard_handlers::get_chemistry_dashboard,
        dashboard_handlers::get_metrology_dashboard,
        // Public
        public_handlers::list_public_fispqs,
        public_handlers::list_public_emergency_sheets,
        public_handlers::list_public_equipment,
        public_handlers::get_public_statistics,
    ),
    components(
        schemas(
            // Shared
            Meta,
            ExpirationStatus,
            StatusSummary,
            // Auth
            auth::model::Role,
            auth::dto::MeResponseDto,
            ApiResponse<auth::dto::MeResponseDto>,
            // Users
            users_dtos::CreateUserDto,
            users_dtos::UpdateUserDto,
            users_dtos::UserResponseDto,
            ApiResponse<users_dtos::UserResponseDto>,
            ApiResponse<Vec<users_dtos::UserResponseDto>>,
            // Files
            files_dtos::DocumentFolder,
            files_dtos::UploadFileDto,
            files_dtos::FileResponseDto,
            ApiResponse<files_dtos::FileResponseDto>,
            // FISPQs
            fispqs_dtos::FispqFormSchema,
            fispqs_dtos::FispqResponseDto,
            fispqs_dtos::FispqStatisticsDto,
            fispqs_dtos::FispqImportRowDto,
            fispqs_dtos::ImportResultDto,
            ApiResponse<fispqs_dtos::FispqResponseDto>,
            ApiResponse<Vec<fispqs_dtos::FispqResponseDto>>,
            ApiResponse<fispqs_dtos::FispqStatisticsDto>,
            ApiResponse<fispqs_dtos::ImportResultDto>,
            // Emergency sheets
            emergency_sheets_dtos::EmergencySheetFormSchema,
            emergency_sheets_dtos::EmergencySheetResponseDto,
            emergency_sheets_dtos::EmergencySheetStatisticsDto,
            ApiResponse<emergency_sheets_dtos::EmergencySheetResponseDto>,
            ApiResponse<Vec<emergency_sheets_dtos::EmergencySheetResponseDto>>,
            ApiResponse<emergency_sheets_dtos::EmergencySheetStatisticsDto>,
            // Certificates
            certificates_dtos::CertificateFormSchema,
            certificates_dtos::CertificateResponseDto,
            certificates_dtos::CertificateStatisticsDto,
            certificates_dtos::NextCertificateNumberDto,
            ApiResponse<certificates_dtos::CertificateResponseDto>,
            ApiResponse<Vec<certificates_dtos::CertificateResponseDto>>,
            ApiResponse<certificates_dtos::CertificateStatisticsDto>,
            ApiResponse<certificates_dtos::NextCertificateNumberDto>,
            // Equipment
            equipment_models::EquipmentStatus,
            equipment_dtos::EquipmentFormDto,
            equipment_dtos::EquipmentResponseDto,
            equipment_dtos::EquipmentStatisticsDto,
            ApiResponse<equipment_dtos::EquipmentResponseDto>,
            ApiResponse<Vec<equipment_dtos::EquipmentResponseDto>>,
            ApiResponse<equipment_dtos::EquipmentStatisticsDto>,
            // Dashboard
            dashboard_dtos::DocumentKind,
            dashboard_dtos::ExpirationAlertDto,
            dashboard_dtos::UserCountsDto,
            dashboard_dtos::RecentCertificateDto,
            dashboard_dtos::AdminDashboardDto,
            dashboard_dtos::ChemistryDashboardDto,
            dashboard_dtos::MetrologyDashboardDto,
            ApiResponse<dashboard_dtos::AdminDashboardDto>,
            ApiResponse<dashboard_dtos::ChemistryDashboardDto>,
            ApiResponse<dashboard_dtos::MetrologyDashboardDto>,
            // Public
            public_dtos::PublicFispqDto,
            public_dtos::PublicEmergencySheetDto,
            public_dtos::PublicEquipmentDto,
            ApiResponse<Vec<public_dtos::PublicFispqDto>>,
            ApiResponse<Vec<public_dtos::PublicEmergencySheetDto>>,
            ApiResponse<Vec<public_dtos::PublicEquipmentDto>>,
            public_dtos::PublicTypeStatisticsDto,
            public_dtos::PublicStatisticsDto,
            ApiResponse<public_dtos::PublicStatisticsDto>,
        )
    ),
    tags(
        (name = "auth", description = "Current user identity"),
        (name = "users", description = "User profiles and role administration"),
        (name = "files", description = "Document file upload and inline viewing"),
        (name = "fispqs", description = "Safety data sheets (chemistry)"),
        (name = "emergency-sheets", description = "Emergency sheets (chemistry)"),
        (name = "certificates", description = "Calibration certificates (metrology)"),
        (name = "equipment", description = "Measuring equipment and calibration schedule (metrology)"),
        (name = "dashboard", description = "Role dashboards and expiration alerts"),
        (name = "public", description = "Public consultation (no authentication)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "SafeDocs API",
        version = "0.1.0",
        description = "API documentation for SafeDocs",
    )
)]
pub struct ApiDoc;

/// Adds the Bearer JWT security scheme to the OpenAPI document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_every_feature() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for path in [
            "/api/auth/me",
            "/api/users/me",
            "/api/admin/users/{id}",
            "/api/files/upload",
            "/api/fispqs/import",
            "/api/emergency-sheets/{id}",
            "/api/certificates/next-number",
            "/api/equipment/{id}",
            "/api/public/equipment",
            "/api/dashboard/metrology",
            "/api/public/statistics",
        ] {
            assert!(paths.contains(&path), "missing path {}", path);
        }

        let schemes = doc.components.unwrap().security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn test_swagger_info_modifier() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Docs".to_string(),
            version: "9.9.9".to_string(),
            description: "Internal".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.title, "Docs");
        assert_eq!(doc.info.version, "9.9.9");
        assert_eq!(doc.info.description.as_deref(), Some("Internal"));
    }
}
