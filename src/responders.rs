use std::sync::Arc;

use tracing::{error, info};

use crate::message::Outcome;
use crate::model::Clinic;
use crate::reply::{self, Reply};
use crate::report::ReportExporter;
use crate::store::{DataStore, StoreError};

pub async fn check_status(store: &Arc<dyn DataStore>, phone: &str) -> Result<Outcome, StoreError> {
    let Some(subscriber) = store.find_subscriber(phone).await? else {
        return Ok(Outcome::reply(Reply::NotAffiliated));
    };
    Ok(Outcome::reply(Reply::Status {
        plan: subscriber.plan,
        consumos: subscriber.consumos,
        consulta_gratis: subscriber.consulta_gratis,
    }))
}

pub async fn list_clinics(store: &Arc<dyn DataStore>) -> Result<Outcome, StoreError> {
    let clinics = store.list_clinics().await?;
    if clinics.is_empty() {
        return Ok(Outcome::reply(Reply::NoClinics));
    }
    let nombres = clinics.into_iter().map(|c| c.nombre).collect();
    Ok(Outcome::reply(Reply::ClinicList { nombres }))
}

/// `agregar clínica <nombre>`: everything after the two keyword words is
/// the clinic name.
pub async fn add_clinic(store: &Arc<dyn DataStore>, body: &str) -> Result<Outcome, StoreError> {
    let nombre = body.split_whitespace().skip(2).collect::<Vec<_>>().join(" ");
    if nombre.is_empty() {
        return Ok(Outcome::reply(Reply::ClinicUsage));
    }
    store.insert_clinic(Clinic { nombre: nombre.clone() }).await?;
    info!("Clinic added: {nombre}");
    Ok(Outcome::reply(Reply::ClinicAdded { nombre }))
}

/// With no key, renders the whole FAQ table; with a known key, that single
/// answer; an unknown key falls back to the talk-to-an-agent card.
pub fn faq(key: Option<&str>) -> Outcome {
    match key {
        None => Outcome::reply(Reply::Faq),
        Some(k) => match reply::faq_answer(k) {
            Some(answer) => Outcome::reply(Reply::FaqAnswer { answer }),
            None => Outcome::reply(Reply::TalkToAgent),
        },
    }
}

pub fn talk_to_agent() -> Outcome {
    Outcome::reply(Reply::TalkToAgent)
}

pub async fn view_history(store: &Arc<dyn DataStore>, phone: &str) -> Result<Outcome, StoreError> {
    if store.find_subscriber(phone).await?.is_none() {
        return Ok(Outcome::reply(Reply::NotAffiliated));
    }
    let records = store.list_consumptions(phone).await?;
    if records.is_empty() {
        return Ok(Outcome::reply(Reply::NoHistory));
    }
    Ok(Outcome::reply(Reply::History { records }))
}

/// Exports every subscriber through the report collaborator. An export
/// failure is logged and answered with the generic failure reply; it never
/// leaves the requester without an answer.
pub async fn download_report(
    store: &Arc<dyn DataStore>,
    exporter: &dyn ReportExporter,
) -> Result<Outcome, StoreError> {
    let subscribers = store.list_subscribers().await?;
    match exporter.export(&subscribers).await {
        Ok(path) => Ok(Outcome::reply(Reply::ReportReady {
            destination: path.display().to_string(),
        })),
        Err(err) => {
            error!("Report export failed: {err}");
            Ok(Outcome::reply(Reply::SystemError))
        }
    }
}
