use riderelay_core::{ResourceGateway, TokenSigner};
use riderelay_db::{Database, DocumentRepository};

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub db: Database,
    pub gateway: ResourceGateway<DocumentRepository>,
    /// Issues and verifies the `token` cookie.
    pub signer: TokenSigner,
}

impl AppState {
    pub fn new(db: Database, signer: TokenSigner) -> Self {
        let gateway = ResourceGateway::new(db.document_repo());
        Self {
            db,
            gateway,
            signer,
        }
    }
}
