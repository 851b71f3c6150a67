use crate::model::{ConsumptionRecord, Plan};

/// Main menu, part of the stable protocol. The original service defines it
/// without routing any command to it; kept verbatim for compatibility.
pub const MENU: &str = "🤖 *Hola, soy Adrian* – Bot de Veidt Health.
Escribe el número de la opción que deseas:

1️⃣ Afiliarme
2️⃣ Consultar mi estado
3️⃣ Ver clínicas afiliadas
4️⃣ Preguntas frecuentes
5️⃣ Hablar con un asesor
6️⃣ Registrar consumo
7️⃣ Usar consulta gratuita
8️⃣ Ver historial de consumos
9️⃣ Descargar reporte";

pub const FAQS: [(&str, &str); 3] = [
    ("1", "No somos un seguro. Ofrecemos membresías médicas con descuentos y consultas."),
    ("2", "Sí, puedes usarla en cualquier ciudad con clínicas afiliadas."),
    ("3", "Pagas por transferencia o con link de pago al momento de afiliarte."),
];

/// Answer for one FAQ key, if known.
pub fn faq_answer(key: &str) -> Option<&'static str> {
    FAQS.iter().find(|(k, _)| *k == key).map(|(_, answer)| *answer)
}

/// Semantic outcome of a handler. Rendering to the literal outbound text
/// happens only here, so presentation never leaks into the handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Acknowledge receipt without sending anything (unrecognized input).
    Silent,
    Menu,
    AskName,
    AskCedula,
    AskPlan,
    InvalidPlan,
    Affiliated { plan: Plan },
    NotAffiliated,
    Status { plan: Option<Plan>, consumos: u32, consulta_gratis: bool },
    NoClinics,
    ClinicList { nombres: Vec<String> },
    ClinicUsage,
    ClinicAdded { nombre: String },
    Faq,
    FaqAnswer { answer: &'static str },
    TalkToAgent,
    ConsumptionUsage,
    SubscriberNotFound,
    ConsumptionRegistered { nombre: String },
    FreeConsultationEarned,
    FreeConsultationUsed,
    NoFreeConsultation,
    NoHistory,
    History { records: Vec<ConsumptionRecord> },
    ReportReady { destination: String },
    SystemError,
}

impl Reply {
    /// Literal text sent through the gateway; `None` sends nothing.
    pub fn render(&self) -> Option<String> {
        let text = match self {
            Reply::Silent => return None,
            Reply::Menu => MENU.to_string(),
            Reply::AskName => "📝 Escribe tu nombre completo:".to_string(),
            Reply::AskCedula => "📄 Escribe tu cédula:".to_string(),
            Reply::AskPlan => {
                "💳 Elige tu plan:\n1. Membresía 1\n2. Membresía 2\n3. Membresía 3".to_string()
            }
            Reply::InvalidPlan => "❌ Plan inválido. Escribe 1, 2 o 3.".to_string(),
            Reply::Affiliated { plan } => {
                format!("✅ Te afiliamos al plan *{}*. ¡Bienvenido!", plan.label())
            }
            Reply::NotAffiliated => "❌ No estás afiliado. Escribe 1 para registrarte.".to_string(),
            Reply::Status { plan, consumos, consulta_gratis } => format!(
                "🧾 Tu estado:\nPlan: {}\nConsumos: {}\nConsulta gratuita: {}",
                plan.map(|p| p.label()).unwrap_or("No asignado"),
                consumos,
                if *consulta_gratis { "Sí" } else { "No" },
            ),
            Reply::NoClinics => "📭 No hay clínicas registradas aún.".to_string(),
            Reply::ClinicList { nombres } => {
                let listado =
                    nombres.iter().map(|n| format!("• {n}")).collect::<Vec<_>>().join("\n");
                format!("🏥 Clínicas afiliadas:\n{listado}")
            }
            Reply::ClinicUsage => "⚠️ Escribe: Agregar clínica <nombre>".to_string(),
            Reply::ClinicAdded { nombre } => {
                format!("✅ Clínica *{nombre}* añadida a la lista.")
            }
            Reply::Faq => {
                let entries = FAQS
                    .iter()
                    .map(|(k, answer)| format!("{k}. {answer}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("❓ Preguntas frecuentes:\n{entries}\n\nEscribe 5 para hablar con un asesor.")
            }
            Reply::FaqAnswer { answer } => (*answer).to_string(),
            Reply::TalkToAgent => "📞 Soporte Veidt Health:\nWhatsApp: 0414-3902085\nCorreo: soporte@veidthealth.com\nHorario: Lun a Vie, 8:00 a 6:00".to_string(),
            Reply::ConsumptionUsage => {
                "⚠️ Usa el formato: Registrar consumo 04141234567 Consulta general".to_string()
            }
            Reply::SubscriberNotFound => {
                "❌ No se encontró un usuario con ese número.".to_string()
            }
            Reply::ConsumptionRegistered { nombre } => {
                format!("✅ Consumo registrado para {nombre}.")
            }
            Reply::FreeConsultationEarned => "🎉 ¡Has acumulado 4 consumos! Ahora tienes una consulta médica gratuita activa.".to_string(),
            Reply::FreeConsultationUsed => {
                "✅ Tu consulta gratuita fue usada. Agenda tu cita en una clínica afiliada."
                    .to_string()
            }
            Reply::NoFreeConsultation => {
                "❌ Aún no tienes una consulta gratuita disponible.".to_string()
            }
            Reply::NoHistory => "📭 No tienes consumos registrados.".to_string(),
            Reply::History { records } => {
                let resumen = records
                    .iter()
                    .map(|record| {
                        let clinica = record
                            .atendido_por
                            .as_deref()
                            .map(|c| format!(" (Clínica: {c})"))
                            .unwrap_or_default();
                        format!(
                            "• {}: {}{}",
                            record.fecha.format("%d/%m/%Y"),
                            record.descripcion,
                            clinica
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("📜 Historial de consumos:\n{resumen}")
            }
            Reply::ReportReady { destination } => format!(
                "📄 El reporte ha sido generado y guardado localmente como {destination}"
            ),
            Reply::SystemError => "⚠️ Ocurrió un error. Intenta de nuevo más tarde.".to_string(),
        };
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConsumptionRecord;
    use chrono::TimeZone;

    #[test]
    fn test_silent_renders_nothing() {
        assert_eq!(Reply::Silent.render(), None);
    }

    #[test]
    fn test_menu_is_verbatim() {
        let menu = Reply::Menu.render().unwrap();
        assert!(menu.starts_with("🤖 *Hola, soy Adrian* – Bot de Veidt Health."));
        assert!(menu.contains("6️⃣ Registrar consumo"));
        assert!(menu.ends_with("9️⃣ Descargar reporte"));
    }

    #[test]
    fn test_affiliated_names_the_plan() {
        let text = Reply::Affiliated { plan: Plan::Membresia2 }.render().unwrap();
        assert_eq!(text, "✅ Te afiliamos al plan *Membresía 2*. ¡Bienvenido!");
    }

    #[test]
    fn test_status_rendering() {
        let text = Reply::Status {
            plan: Some(Plan::Membresia1),
            consumos: 3,
            consulta_gratis: false,
        }
        .render()
        .unwrap();
        assert!(text.contains("Plan: Membresía 1"));
        assert!(text.contains("Consumos: 3"));
        assert!(text.contains("Consulta gratuita: No"));
    }

    #[test]
    fn test_history_lines_carry_clinic_when_present() {
        let mut with_clinic = ConsumptionRecord::new("0414111", "Consulta general".into());
        with_clinic.fecha = chrono::Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap();
        with_clinic.atendido_por = Some("Clínica Salud Total".into());

        let mut bare = ConsumptionRecord::new("0414111", "Limpieza".into());
        bare.fecha = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();

        let text = Reply::History { records: vec![with_clinic, bare] }.render().unwrap();
        assert!(text.starts_with("📜 Historial de consumos:\n"));
        assert!(text.contains("• 05/03/2024: Consulta general (Clínica: Clínica Salud Total)"));
        assert!(text.contains("• 01/03/2024: Limpieza\n") || text.ends_with("• 01/03/2024: Limpieza"));
    }

    #[test]
    fn test_faq_lookup_and_fallback() {
        assert_eq!(
            faq_answer("2"),
            Some("Sí, puedes usarla en cualquier ciudad con clínicas afiliadas.")
        );
        assert_eq!(faq_answer("99"), None);

        let listing = Reply::Faq.render().unwrap();
        for (_, answer) in FAQS {
            assert!(listing.contains(answer));
        }
    }

    #[test]
    fn test_clinic_list_is_newline_joined() {
        let text = Reply::ClinicList {
            nombres: vec!["Clínica A".into(), "Clínica B".into()],
        }
        .render()
        .unwrap();
        assert_eq!(text, "🏥 Clínicas afiliadas:\n• Clínica A\n• Clínica B");
    }
}
