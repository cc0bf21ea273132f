mod api;
mod intake;
mod notice;
mod pages;
mod views;

use crate::application::{ComplianceUseCase, ExportUseCase, InspectionUseCase, ReportsUseCase};
use crate::infrastructure::bootstrap::Services;
use crate::infrastructure::fonts::FontFile;
use crate::infrastructure::record_store::RecordStore;
use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{dev::Server, web, App, HttpServer};
use std::path::PathBuf;
use std::sync::Arc;

pub struct HttpState {
    pub store: Option<Arc<RecordStore>>,
    pub upload_dir: PathBuf,
    pub pdf_font: Option<FontFile>,
}

impl HttpState {
    pub fn new(services: Services) -> Self {
        Self {
            store: services.store,
            upload_dir: services.upload_dir,
            pdf_font: services.pdf_font,
        }
    }

    fn inspections(&self) -> Option<InspectionUseCase> {
        self.store.clone().map(InspectionUseCase::new)
    }

    fn compliance(&self) -> Option<ComplianceUseCase> {
        self.store.clone().map(ComplianceUseCase::new)
    }

    fn reports(&self) -> Option<ReportsUseCase> {
        self.store.clone().map(ReportsUseCase::new)
    }

    fn exports(&self) -> Option<ExportUseCase> {
        self.store
            .clone()
            .map(|store| ExportUseCase::new(store).with_pdf_font(self.pdf_font.clone()))
    }
}

/// Every route, for the server and for tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(pages::index)
        .service(pages::inspect_form)
        .service(pages::inspect_submit)
        .service(pages::edit_form)
        .service(pages::edit_submit)
        .service(pages::compliance_list)
        .service(pages::compliance_update)
        .service(pages::reports)
        .service(pages::export_pdf)
        .service(pages::export_word)
        .service(
            web::scope("/api")
                .service(api::inspection_detail)
                .service(api::inspection_list)
                .service(api::inspect),
        );
}

pub fn start_server(services: Services, host: &str, port: u16) -> std::io::Result<Server> {
    let state = web::Data::new(HttpState::new(services));

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((host, port))?
    .run();

    Ok(server)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::infrastructure::google::memory::{MemoryDrive, MemorySheets};

    pub struct Harness {
        pub sheets: Arc<MemorySheets>,
        pub drive: Arc<MemoryDrive>,
        pub state: web::Data<HttpState>,
        pub upload_dir: PathBuf,
    }

    impl Harness {
        pub fn new() -> Self {
            let (sheets, drive, store) = RecordStore::in_memory();
            let upload_dir =
                std::env::temp_dir().join(format!("daptar-http-{}", uuid::Uuid::new_v4()));
            std::fs::create_dir_all(&upload_dir).unwrap();
            let state = web::Data::new(HttpState {
                store: Some(Arc::new(store)),
                upload_dir: upload_dir.clone(),
                pdf_font: None,
            });
            Self {
                sheets,
                drive,
                state,
                upload_dir,
            }
        }

        pub fn disconnected() -> web::Data<HttpState> {
            web::Data::new(HttpState {
                store: None,
                upload_dir: std::env::temp_dir(),
                pdf_font: None,
            })
        }
    }

    impl Drop for Harness {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.upload_dir);
        }
    }

    pub const BOUNDARY: &str = "daptar-boundary";

    /// `(name, filename, value)`; a `Some` filename makes a file part.
    pub fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, file_name, value) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                    name, file_name
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body
    }

    pub fn multipart_content_type() -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }
}
