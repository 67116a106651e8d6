use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::backend::ResourceGateway;
use crate::domain::resource::Resource;
use crate::dto::SearchQuery;
use crate::routes::AccessToken;
use crate::services::ServiceError;
use crate::services::resources::search_json;
use crate::session::{LOGIN_ROUTE, SESSION_EXPIRED_MESSAGE};

/// `GET /api/v1/<endpoint>/search?q=&page=&limit=` answering
/// `{data, pagination}`.
pub async fn search<E: Resource>(
    token: AccessToken,
    query: web::Query<SearchQuery>,
    gateway: web::Data<dyn ResourceGateway>,
    session: Session,
) -> HttpResponse {
    match search_json::<E, _>(gateway.get_ref(), &token, query.into_inner()).await {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(ServiceError::Unauthorized) => {
            session.purge();
            HttpResponse::Unauthorized().json(json!({
                "error": SESSION_EXPIRED_MESSAGE,
                "redirect": LOGIN_ROUTE,
            }))
        }
        Err(err) => HttpResponse::BadGateway().json(json!({ "error": err.to_string() })),
    }
}
