#[actix_web::main]
async fn main() -> std::io::Result<()> {
    daptar_lib::run().await
}
