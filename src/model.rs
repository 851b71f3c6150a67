use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three fixed membership plans offered by Veidt Health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plan {
    Membresia1,
    Membresia2,
    Membresia3,
}

impl Plan {
    /// Maps the subscriber's plan choice ("1", "2" or "3") to a plan.
    pub fn from_choice(choice: &str) -> Option<Plan> {
        match choice {
            "1" => Some(Plan::Membresia1),
            "2" => Some(Plan::Membresia2),
            "3" => Some(Plan::Membresia3),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Plan::Membresia1 => "Membresía 1",
            Plan::Membresia2 => "Membresía 2",
            Plan::Membresia3 => "Membresía 3",
        }
    }
}

/// A person enrolled in the membership service, keyed by phone number.
///
/// Only the affiliation flow creates subscribers, so a subscriber with a
/// plan always carries the name and cédula collected by that flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    pub phone: String,
    pub nombre: String,
    pub cedula: String,
    pub plan: Option<Plan>,
    pub consumos: u32,
    pub consulta_gratis: bool,
    pub afiliado_desde: DateTime<Utc>,
}

impl Subscriber {
    pub fn new(phone: &str, nombre: String, cedula: String, plan: Plan) -> Self {
        Self {
            phone: phone.to_string(),
            nombre,
            cedula,
            plan: Some(plan),
            consumos: 0,
            consulta_gratis: false,
            afiliado_desde: Utc::now(),
        }
    }
}

/// Append-only record of one consumption event. Ordered newest-first for
/// history display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    pub phone: String,
    pub fecha: DateTime<Utc>,
    pub descripcion: String,
    pub atendido_por: Option<String>,
}

impl ConsumptionRecord {
    pub fn new(phone: &str, descripcion: String) -> Self {
        Self {
            phone: phone.to_string(),
            fecha: Utc::now(),
            descripcion,
            atendido_por: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clinic {
    pub nombre: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_from_choice() {
        assert_eq!(Plan::from_choice("1"), Some(Plan::Membresia1));
        assert_eq!(Plan::from_choice("2"), Some(Plan::Membresia2));
        assert_eq!(Plan::from_choice("3"), Some(Plan::Membresia3));
        assert_eq!(Plan::from_choice("4"), None);
        assert_eq!(Plan::from_choice(""), None);
        assert_eq!(Plan::from_choice("membresía 1"), None);
    }

    #[test]
    fn test_plan_labels() {
        assert_eq!(Plan::Membresia1.label(), "Membresía 1");
        assert_eq!(Plan::Membresia2.label(), "Membresía 2");
        assert_eq!(Plan::Membresia3.label(), "Membresía 3");
    }

    #[test]
    fn test_new_subscriber_starts_clean() {
        let s = Subscriber::new("0414123", "Ana".into(), "123".into(), Plan::Membresia2);
        assert_eq!(s.consumos, 0);
        assert!(!s.consulta_gratis);
        assert_eq!(s.plan, Some(Plan::Membresia2));
    }
}
