//! Fixed texts of the Harmonia persona.
//!
//! Every user-facing string the bot can send without the completion API lives
//! here, so the command router and the relay never hardcode text.

/// Reply to `/start`.
pub const WELCOME_TEXT: &str = "Привіт 🌿 Я Harmonia.\n\
    Напиши, що турбує — я відповім.\n\
    Або введи /vprava, щоб отримати психо-вправу.";

/// Reply to `/vprava`: the 4-7-8 breathing exercise.
pub const EXERCISE_TEXT: &str = "🧘 Вправа «4-7-8»:\n\
    1) вдих на 4\n\
    2) затримка на 7\n\
    3) видих на 8\n\
    Повтори 4 кола.";

/// Reply to free text when no API key is configured.
pub const NO_AI_FALLBACK_TEXT: &str = "Я поки без ШІ, але я тут 🙂 Напиши /vprava.";

/// Reply to free text when the completion API call fails.
pub const TECHNICAL_PAUSE_TEXT: &str =
    "Схоже, в мене зараз технічна пауза 🤖 Спробуй трохи пізніше.";

/// Default system prompt sent with every completion request.
pub const SYSTEM_PROMPT: &str = "Ти доброзичливий психологічний асистент українською.";

/// Body of the liveness HTTP route.
pub const LIVENESS_BODY: &str = "Harmonia bot is running ✅";
