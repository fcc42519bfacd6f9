// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Medicines ---
        handlers::medicines::list_medicines,
        handlers::medicines::create_medicine,
        handlers::medicines::get_medicine,
        handlers::medicines::update_medicine,
        handlers::medicines::delete_medicine,

        // --- Stock ---
        handlers::medicines::receive_stock,
        handlers::medicines::sell_medicine,
        handlers::stock::adjust_stock,

        // --- Dashboard / Alerts ---
        handlers::reports::get_dashboard,
        handlers::reports::get_alerts,
        handlers::reports::get_low_stock,

        // --- Expired ---
        handlers::reports::get_expired,
        handlers::reports::sweep_expired,

        // --- History ---
        handlers::reports::list_transactions,
        handlers::reports::list_sales,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Medicines ---
            models::medicine::MedicineCategory,
            models::medicine::MedicineStatus,
            models::medicine::Medicine,
            models::medicine::MedicineView,
            models::medicine::MedicineDetail,

            // --- Ledger ---
            models::ledger::TransactionType,
            models::ledger::Transaction,
            models::ledger::Sale,
            models::ledger::TransactionEntry,
            models::ledger::SaleEntry,
            models::ledger::StockChange,
            models::ledger::SaleReceipt,
            models::ledger::StockAdjustment,

            // --- Expired / Dashboard ---
            models::expiry::ExpiredMedicine,
            models::expiry::ExpiredReport,
            models::expiry::SweepResult,
            models::dashboard::DashboardSummary,
            models::dashboard::DashboardView,
            models::dashboard::AlertsView,

            // --- Payloads ---
            handlers::medicines::MedicinePayload,
            handlers::medicines::ReceiveStockPayload,
            handlers::medicines::SellPayload,
            handlers::stock::AdjustStockPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário"),
        (name = "Medicines", description = "Cadastro de Medicamentos"),
        (name = "Stock", description = "Entradas, Vendas e Ajustes de Estoque"),
        (name = "Dashboard", description = "Indicadores do Painel"),
        (name = "Alerts", description = "Vencimentos Próximos e Estoque Baixo"),
        (name = "Expired", description = "Registro de Medicamentos Vencidos"),
        (name = "History", description = "Histórico de Movimentações e Vendas")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}
