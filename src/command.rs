/// Everything an inbound message can ask for. The router matches this
/// exhaustively, so an unroutable command cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ContinueFlow,
    StartAffiliation,
    CheckStatus,
    ListClinics,
    Faq,
    TalkToAgent,
    RegisterConsumption,
    UseFreeConsultation,
    ViewHistory,
    DownloadReport,
    AddClinic,
    Unrecognized,
}

/// Keyword phrases form a stable textual protocol together with the menu
/// digits; do not change them without a migration plan for subscribers.
pub const REGISTER_CONSUMPTION_PREFIX: &str = "registrar consumo";
pub const ADD_CLINIC_PREFIX: &str = "agregar clínica";

/// Classifies a trimmed message body. Pure: the only inputs are whether a
/// flow is active for the sender and the text itself.
///
/// An active flow always wins, regardless of content, so a subscriber who
/// answers "3" mid-affiliation is giving a flow answer, not listing
/// clinics.
pub fn classify(flow_active: bool, body: &str) -> Command {
    if flow_active {
        return Command::ContinueFlow;
    }

    match body {
        "1" => Command::StartAffiliation,
        "2" => Command::CheckStatus,
        "3" => Command::ListClinics,
        "4" => Command::Faq,
        "5" => Command::TalkToAgent,
        "6" => Command::RegisterConsumption,
        "7" => Command::UseFreeConsultation,
        "8" => Command::ViewHistory,
        "9" => Command::DownloadReport,
        _ => {
            let lower = body.to_lowercase();
            if lower.starts_with(REGISTER_CONSUMPTION_PREFIX) {
                Command::RegisterConsumption
            } else if lower.starts_with(ADD_CLINIC_PREFIX) {
                Command::AddClinic
            } else {
                Command::Unrecognized
            }
        }
    }
}
