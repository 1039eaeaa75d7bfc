use actix_web::{
    post,
    web::{self, Data},
    HttpResponse, Responder,
};

use crate::{
    errors::AppError,
    kinds::{Contacts, Quotes, SupportTickets},
    structs::{NewContactSubmission, NewQuoteRequest, NewSupportInquiry},
    AppState,
};

#[post("/api/quotes")]
pub async fn create_quote(
    state: Data<AppState>,
    web::Json(draft): web::Json<NewQuoteRequest>,
) -> Result<impl Responder, AppError> {
    let quote = state.requests.create::<Quotes>(draft).await?;
    Ok(HttpResponse::Created().json(quote))
}

#[post("/api/contacts")]
pub async fn create_contact(
    state: Data<AppState>,
    web::Json(draft): web::Json<NewContactSubmission>,
) -> Result<impl Responder, AppError> {
    let contact = state.requests.create::<Contacts>(draft).await?;
    Ok(HttpResponse::Created().json(contact))
}

#[post("/api/support")]
pub async fn create_support(
    state: Data<AppState>,
    web::Json(draft): web::Json<NewSupportInquiry>,
) -> Result<impl Responder, AppError> {
    let inquiry = state.requests.create::<SupportTickets>(draft).await?;
    Ok(HttpResponse::Created().json(inquiry))
}
