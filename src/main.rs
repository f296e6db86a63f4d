#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    jurnal_voucher_server::run().await
}
