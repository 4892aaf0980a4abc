//! Shared constants used across the application
//!
//! The scripted conversation strings are French, matching the assistant persona;
//! UI chrome stays English.

/// Default base URL of the local model runtime server.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

/// Default model pulled and used for chat.
pub const DEFAULT_MODEL: &str = "qwen2.5:0.5b-instruct";

/// System prompt prefixed to every generation request. Never shown in the
/// transcript.
pub const SYSTEM_PROMPT: &str = "Tu es un assistant IA serviable et amical. Réponds en français de manière naturelle, engageante et avec de l'empathie. Utilise des emojis quand c'est approprié pour rendre la conversation plus vivante.";

/// Greeting appended once the model is ready.
pub const GREETING: &str = "👋 Salut ! Je suis ton assistant IA personnel. Comment puis-je t'aider aujourd'hui ?";

/// Transcript message shown when the model could not be loaded.
pub const LOAD_FAILURE_MESSAGE: &str = "❌ Désolé, une erreur s'est produite lors du chargement. Vérifiez que le serveur de modèles est démarré, puis réessayez avec Ctrl+R.";

/// Transcript message shown when a generation request failed.
pub const GENERATION_FAILURE_MESSAGE: &str = "❌ Désolé, une erreur s'est produite lors de la génération de la réponse. Pouvez-vous réessayer ?";

/// Status labels for the three indicator states.
pub const STATUS_LOADING: &str = "Chargement du modèle…";
pub const STATUS_THINKING: &str = "En train de réfléchir…";
pub const STATUS_READY: &str = "En ligne";
pub const STATUS_ERROR: &str = "Erreur de connexion";

/// Sampling temperature for every request.
pub const TEMPERATURE: f64 = 0.7;

/// Maximum tokens generated per reply.
pub const MAX_TOKENS: u32 = 1000;

/// Fixed pause before a generation request is issued, so replies never land
/// jarringly fast.
pub const THINKING_DELAY_MS: u64 = 800;

/// Interval between typing-effect reveals.
pub const TYPING_INTERVAL_MS: u64 = 30;
