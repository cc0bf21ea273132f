use super::intake::read_multipart;
use super::HttpState;
use crate::application::InspectionForm;
use crate::domain::error::AppError;
use actix_multipart::Multipart;
use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;
use tracing::error;

fn unavailable() -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(json!({
        "success": false,
        "error": "Google Sheet connection unavailable",
    }))
}

#[get("/inspection/{id}")]
async fn inspection_detail(data: web::Data<HttpState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    let Some(use_case) = data.inspections() else {
        return unavailable();
    };

    match use_case.detail(&id).await {
        Ok(detail) => HttpResponse::Ok().json(json!({
            "success": true,
            "inspection": detail.inspection,
            "answers": detail.answers,
            "files": detail.files,
            "compliance": detail.compliance,
        })),
        Err(AppError::NotFound(_)) => HttpResponse::NotFound().json(json!({
            "success": false,
            "error": "Inspection not found",
        })),
        Err(e) => {
            error!(error = %e, inspection_id = %id, "Failed to load inspection");
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": e.to_string(),
            }))
        }
    }
}

#[get("/inspections")]
async fn inspection_list(data: web::Data<HttpState>) -> impl Responder {
    let Some(use_case) = data.inspections() else {
        return unavailable();
    };
    let inspections = use_case.list().await;
    HttpResponse::Ok().json(json!({
        "success": true,
        "inspections": inspections,
    }))
}

#[post("/inspect")]
async fn inspect(data: web::Data<HttpState>, payload: Multipart) -> impl Responder {
    let Some(use_case) = data.inspections() else {
        return unavailable();
    };

    let result = match read_multipart(payload, &data.upload_dir).await {
        Ok(intake) => {
            let form = InspectionForm::from_fields(&intake.fields);
            use_case.submit(&form, intake.uploads).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(submission) => HttpResponse::Ok().json(json!({
            "success": true,
            "inspectionId": submission.inspection_id,
            "message": "तपासणी यशस्वीरित्या जतन केली आहे!",
        })),
        Err(e) => {
            error!(error = %e, "Error processing inspection");
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": "त्रुटी: तपासणी जतन करण्यात अयशस्वी.",
            }))
        }
    }
}
