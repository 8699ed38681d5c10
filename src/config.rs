//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable
//! (`CONFIG`) con valores por defecto razonables para la simulación.
use once_cell::sync::Lazy;
use std::env;

/// Configuración global de la aplicación.
pub struct AppConfig {
    /// Actor por defecto para las invocaciones del demo (`WIKIFLOW_ACTOR`).
    pub default_actor: String,
    /// Si el demo siembra el workspace de ejemplo (`WIKIFLOW_SEED`, "0" lo
    /// desactiva).
    pub seed: bool,
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    let default_actor = env::var("WIKIFLOW_ACTOR").unwrap_or_else(|_| "1".to_string());
    let seed = env::var("WIKIFLOW_SEED").map(|v| v != "0").unwrap_or(true);
    AppConfig { default_actor, seed }
});
