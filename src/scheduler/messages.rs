//! Notification copy for each reminder category.

use rand::Rng;
use rand::seq::SliceRandom;

use super::triggers::TriggerCategory;

/// Rendered notification content for one fired category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderMessage {
    pub category: TriggerCategory,
    pub title: &'static str,
    pub body: &'static str,
    pub tag: &'static str,
}

/// Notification title.
pub fn title(category: TriggerCategory) -> &'static str {
    match category {
        TriggerCategory::Breakfast => "FitMind: Café da Manhã",
        TriggerCategory::Lunch => "FitMind: Almoço",
        TriggerCategory::Snack => "FitMind: Lanche",
        TriggerCategory::Dinner => "FitMind: Jantar",
        TriggerCategory::Checkin => "FitMind: Check-in Diário",
        TriggerCategory::Medication => "FitMind: Medicação",
        TriggerCategory::Hydration => "FitMind: Hidratação",
    }
}

/// Dedup tag; a second notification with the same tag replaces the first.
pub fn tag(category: TriggerCategory) -> &'static str {
    match category {
        TriggerCategory::Breakfast => "meal-breakfast",
        TriggerCategory::Lunch => "meal-lunch",
        TriggerCategory::Snack => "meal-snack",
        TriggerCategory::Dinner => "meal-dinner",
        TriggerCategory::Checkin => "checkin",
        TriggerCategory::Medication => "medication",
        TriggerCategory::Hydration => "hydration",
    }
}

/// Body text candidates.
pub fn pool(category: TriggerCategory) -> &'static [&'static str] {
    match category {
        TriggerCategory::Breakfast => &[
            "Bom dia! Hora de registrar seu café da manhã.",
            "Comece o dia bem: o que você comeu no café?",
            "Não esqueça de anotar seu café da manhã.",
        ],
        TriggerCategory::Lunch => &[
            "Hora do almoço! Registre sua refeição.",
            "O que tem no prato hoje? Anote seu almoço.",
            "Pausa para o almoço: lembre de registrar.",
        ],
        TriggerCategory::Snack => &[
            "Hora do lanche! Que tal algo leve?",
            "Bateu a fome? Registre seu lanche.",
            "Lanche da tarde: não esqueça de anotar.",
        ],
        TriggerCategory::Dinner => &[
            "Hora do jantar! Registre sua última refeição.",
            "Jantar servido? Anote o que você comeu.",
            "Feche o dia registrando seu jantar.",
        ],
        TriggerCategory::Checkin => &[
            "Como foi seu dia? Faça seu check-in.",
            "Hora do check-in diário: registre seu peso e humor.",
            "Um minuto para o seu check-in de hoje.",
        ],
        TriggerCategory::Medication => &[
            "Hora da sua medicação.",
            "Lembrete: tome sua medicação agora.",
            "Não esqueça da sua aplicação de hoje.",
        ],
        TriggerCategory::Hydration => &[
            "Beba um copo de água!",
            "Hora de se hidratar.",
            "Seu corpo agradece: beba água agora.",
        ],
    }
}

/// Build the notification for `category`, picking a body uniformly at random.
pub fn compose<R: Rng + ?Sized>(category: TriggerCategory, rng: &mut R) -> ReminderMessage {
    ReminderMessage {
        category,
        title: title(category),
        body: pool(category).choose(rng).copied().unwrap_or_default(),
        tag: tag(category),
    }
}
