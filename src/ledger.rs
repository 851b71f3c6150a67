use std::sync::Arc;

use tracing::info;

use crate::command::REGISTER_CONSUMPTION_PREFIX;
use crate::message::Outcome;
use crate::model::ConsumptionRecord;
use crate::reply::Reply;
use crate::store::{DataStore, StoreError};

/// Consumptions needed to earn a free consultation.
pub const FREE_CONSULTATION_THRESHOLD: u32 = 4;

/// Target phone named by a `registrar consumo` body, without any lookup.
/// The router uses this to widen its lock scope to the record the command
/// mutates, which belongs to the target rather than the sender.
pub fn consumption_target(body: &str) -> Option<&str> {
    if !body.to_lowercase().starts_with(REGISTER_CONSUMPTION_PREFIX) {
        return None;
    }
    body.split_whitespace().nth(2)
}

/// Registers one consumption against a target subscriber.
///
/// `body` is the raw command: `registrar consumo <phone> <description…>`.
/// The consumption record is inserted before the counter update: it is
/// the audit trail and survives a failed counter save. Crossing the
/// threshold sets the free-consultation flag, resets the counter and
/// attaches a side notification for the target; this is the only path
/// that produces two outbound messages from one inbound message.
pub async fn register_consumption(
    store: &Arc<dyn DataStore>,
    body: &str,
) -> Result<Outcome, StoreError> {
    let tokens: Vec<&str> = body.split_whitespace().collect();
    if tokens.len() < 3 {
        return Ok(Outcome::reply(Reply::ConsumptionUsage));
    }
    let target = tokens[2];
    let descripcion = tokens[3..].join(" ");

    let Some(mut subscriber) = store.find_subscriber(target).await? else {
        return Ok(Outcome::reply(Reply::SubscriberNotFound));
    };

    store.insert_consumption(ConsumptionRecord::new(target, descripcion)).await?;

    subscriber.consumos += 1;
    let mut earned = false;
    if subscriber.consumos >= FREE_CONSULTATION_THRESHOLD {
        subscriber.consulta_gratis = true;
        subscriber.consumos = 0;
        earned = true;
    }
    store.save_subscriber(subscriber.clone()).await?;
    info!(
        "Consumption registered: target={target}, consumos={}, reward={earned}",
        subscriber.consumos
    );

    let reply = Reply::ConsumptionRegistered { nombre: subscriber.nombre };
    if earned {
        Ok(Outcome::with_notification(reply, target, Reply::FreeConsultationEarned))
    } else {
        Ok(Outcome::reply(reply))
    }
}

/// Redeems the sender's free consultation.
///
/// Requires an affiliated subscriber with the flag set; the flag is
/// cleared and persisted before confirming. The router holds the
/// per-subscriber lock across this call, so two concurrent redemptions
/// cannot both see the flag set.
pub async fn use_free_consultation(
    store: &Arc<dyn DataStore>,
    phone: &str,
) -> Result<Outcome, StoreError> {
    let Some(mut subscriber) = store.find_subscriber(phone).await? else {
        return Ok(Outcome::reply(Reply::NotAffiliated));
    };
    if !subscriber.consulta_gratis {
        return Ok(Outcome::reply(Reply::NoFreeConsultation));
    }

    subscriber.consulta_gratis = false;
    store.save_subscriber(subscriber).await?;
    info!("Free consultation used: phone={phone}");
    Ok(Outcome::reply(Reply::FreeConsultationUsed))
}
