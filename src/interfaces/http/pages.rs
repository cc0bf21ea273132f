use super::intake::read_multipart;
use super::notice::{redirect, Level, NoticeQuery};
use super::{views, HttpState};
use crate::application::use_cases::export::{attachment_name, DOCX_MIME, PDF_MIME};
use crate::application::{ComplianceForm, InspectionForm};
use crate::domain::error::AppError;
use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{get, post, web, HttpResponse, Responder};
use tracing::error;

const MSG_SAVED: &str = "तपासणी यशस्वीरित्या जतन केली आहे!";
const MSG_UPDATED: &str = "तपासणी यशस्वीरित्या अपडेट केली आहे!";
const MSG_SAVE_FAILED: &str = "त्रुटी: तपासणी जतन करण्यात अयशस्वी.";
const MSG_NO_CONNECTION: &str = "त्रुटी: Google Sheet कनेक्शन अयशस्वी.";
const MSG_COMPLIANCE_UPDATED: &str = "अनुपालन यशस्वीरित्या अपडेट केले आहे!";
const MSG_COMPLIANCE_FAILED: &str = "त्रुटी: अपडेट अयशस्वी.";
const MSG_NOT_FOUND: &str = "Inspection not found";
const MSG_SHEET_ERROR: &str = "Sheet connection error";

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn attachment(bytes: Vec<u8>, mime: &str, file_name: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(mime)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file_name)],
        })
        .body(bytes)
}

#[get("/")]
async fn index(data: web::Data<HttpState>, query: web::Query<NoticeQuery>) -> impl Responder {
    let inspections = match data.inspections() {
        Some(use_case) => use_case.list().await,
        None => Vec::new(),
    };
    html(views::dashboard(&inspections, query.notice().as_ref()))
}

#[get("/inspect")]
async fn inspect_form(data: web::Data<HttpState>, query: web::Query<NoticeQuery>) -> impl Responder {
    let questions = match data.inspections() {
        Some(use_case) => use_case.questions().await,
        None => crate::domain::inspection::Question::fallback_questions(),
    };
    html(views::inspection_form(
        None,
        &questions,
        &[],
        query.notice().as_ref(),
    ))
}

#[post("/inspect")]
async fn inspect_submit(data: web::Data<HttpState>, payload: Multipart) -> impl Responder {
    let Some(use_case) = data.inspections() else {
        return redirect("/", MSG_NO_CONNECTION, Level::Danger);
    };

    let intake = match read_multipart(payload, &data.upload_dir).await {
        Ok(intake) => intake,
        Err(e) => {
            error!(error = %e, "Failed to read inspection form");
            return redirect("/", MSG_SAVE_FAILED, Level::Danger);
        }
    };

    let form = InspectionForm::from_fields(&intake.fields);
    match use_case.submit(&form, intake.uploads).await {
        Ok(_) => redirect("/", MSG_SAVED, Level::Success),
        Err(e) => {
            error!(error = %e, "Failed to save inspection");
            redirect("/", MSG_SAVE_FAILED, Level::Danger)
        }
    }
}

#[get("/edit_inspection/{id}")]
async fn edit_form(
    data: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<NoticeQuery>,
) -> impl Responder {
    let id = path.into_inner();
    let Some(use_case) = data.inspections() else {
        return redirect("/", MSG_SHEET_ERROR, Level::Danger);
    };

    match use_case.detail(&id).await {
        Ok(detail) => {
            let questions = use_case.questions().await;
            html(views::inspection_form(
                Some(&detail.inspection),
                &questions,
                &detail.answers,
                query.notice().as_ref(),
            ))
        }
        Err(e) => {
            error!(error = %e, inspection_id = %id, "Cannot edit inspection");
            redirect("/", MSG_NOT_FOUND, Level::Danger)
        }
    }
}

#[post("/edit_inspection/{id}")]
async fn edit_submit(
    data: web::Data<HttpState>,
    path: web::Path<String>,
    payload: Multipart,
) -> impl Responder {
    let id = path.into_inner();
    let Some(use_case) = data.inspections() else {
        return redirect("/", MSG_NO_CONNECTION, Level::Danger);
    };

    let intake = match read_multipart(payload, &data.upload_dir).await {
        Ok(intake) => intake,
        Err(e) => {
            error!(error = %e, inspection_id = %id, "Failed to read inspection form");
            return redirect("/", MSG_SAVE_FAILED, Level::Danger);
        }
    };

    let form = InspectionForm::from_fields(&intake.fields);
    match use_case.resubmit(&id, &form, intake.uploads).await {
        Ok(_) => redirect("/", MSG_UPDATED, Level::Success),
        Err(AppError::NotFound(_)) => redirect("/", MSG_NOT_FOUND, Level::Danger),
        Err(e) => {
            error!(error = %e, inspection_id = %id, "Failed to update inspection");
            redirect("/", MSG_SAVE_FAILED, Level::Danger)
        }
    }
}

#[get("/compliance")]
async fn compliance_list(data: web::Data<HttpState>, query: web::Query<NoticeQuery>) -> impl Responder {
    let entries = match data.compliance() {
        Some(use_case) => use_case.list().await,
        None => Vec::new(),
    };
    html(views::compliance(&entries, query.notice().as_ref()))
}

#[post("/compliance")]
async fn compliance_update(
    data: web::Data<HttpState>,
    form: web::Form<ComplianceForm>,
) -> impl Responder {
    let Some(use_case) = data.compliance() else {
        return redirect("/compliance", MSG_COMPLIANCE_FAILED, Level::Danger);
    };

    match use_case.update(&form).await {
        Ok(()) => redirect("/compliance", MSG_COMPLIANCE_UPDATED, Level::Success),
        Err(e) => {
            error!(error = %e, log_id = %form.log_id, "Compliance update failed");
            redirect("/compliance", MSG_COMPLIANCE_FAILED, Level::Danger)
        }
    }
}

#[get("/reports")]
async fn reports(data: web::Data<HttpState>, query: web::Query<NoticeQuery>) -> impl Responder {
    let summary = match data.reports() {
        Some(use_case) => use_case.summary().await,
        None => Default::default(),
    };
    html(views::reports(&summary, query.notice().as_ref()))
}

#[get("/export_pdf/{id}")]
async fn export_pdf(data: web::Data<HttpState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    let Some(exports) = data.exports() else {
        return redirect("/", MSG_SHEET_ERROR, Level::Danger);
    };

    match exports.pdf(&id).await {
        Ok(bytes) => attachment(bytes, PDF_MIME, attachment_name(&id, "pdf")),
        Err(AppError::NotFound(_)) => redirect("/", MSG_NOT_FOUND, Level::Danger),
        Err(e) => {
            error!(error = %e, inspection_id = %id, "PDF generation error");
            redirect("/", "Failed to generate PDF report.", Level::Danger)
        }
    }
}

#[get("/export_word/{id}")]
async fn export_word(data: web::Data<HttpState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    let Some(exports) = data.exports() else {
        return redirect("/", MSG_SHEET_ERROR, Level::Danger);
    };

    match exports.docx(&id).await {
        Ok(bytes) => attachment(bytes, DOCX_MIME, attachment_name(&id, "docx")),
        Err(AppError::NotFound(_)) => redirect("/", MSG_NOT_FOUND, Level::Danger),
        Err(e) => {
            error!(error = %e, inspection_id = %id, "Word generation error");
            redirect("/", "Failed to generate Word report.", Level::Danger)
        }
    }
}
