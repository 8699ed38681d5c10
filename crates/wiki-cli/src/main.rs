use serde_json::{json, Value};
use wiki_tools::{seed, SharedStore, ToolRegistry};

async fn build_registry(seed_data: bool) -> ToolRegistry {
    let store = SharedStore::new();
    if seed_data {
        let mut guard = store.write().await;
        let _ = seed::seed_workspace(&mut guard);
    }
    ToolRegistry::new(store)
}

#[tokio::main]
async fn main() {
    // Cargar .env si existe (RUST_LOG, WIKIFLOW_*)
    let _ = dotenvy::dotenv();
    env_logger::init();

    // CLI mínima:
    //   wiki-cli tools
    //   wiki-cli call <TOOL> --payload '<JSON>' [--no-seed] [--pretty]
    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 2 && args[1] == "tools" {
        let registry = build_registry(false).await;
        for def in registry.definitions() {
            println!("{:<28} {}", def.name, def.description);
        }
        std::process::exit(0);
    }

    if args.len() >= 3 && args[1] == "call" {
        let tool = args[2].clone();
        let mut payload: Option<String> = None;
        let mut with_seed = true;
        let mut pretty = false;
        let mut i = 3;
        while i < args.len() {
            match args[i].as_str() {
                "--payload" => {
                    i += 1;
                    if i < args.len() { payload = Some(args[i].clone()); }
                }
                "--no-seed" => { with_seed = false; }
                "--pretty" => { pretty = true; }
                _ => {}
            }
            i += 1;
        }

        let payload: Value = match payload.as_deref() {
            Some(raw) => match serde_json::from_str(raw) {
                Ok(v) => v,
                Err(e) => { eprintln!("[wiki call] payload no es JSON: {e}"); std::process::exit(2); }
            },
            None => json!({}),
        };

        // Sesión efímera: se siembra el workspace de ejemplo (salvo
        // --no-seed), se despacha una sola invocación y se imprime el
        // resultado serializado. No hay persistencia entre llamadas.
        let registry = build_registry(with_seed).await;
        let result = registry.dispatch(&tool, payload).await;
        let rendered = if pretty {
            serde_json::to_string_pretty(&result).unwrap_or_else(|_| result.to_string())
        } else {
            result.to_string()
        };
        println!("{rendered}");
        if result.get("error").is_some() {
            std::process::exit(4);
        }
        std::process::exit(0);
    }

    eprintln!("Uso: wiki-cli tools");
    eprintln!("     wiki-cli call <TOOL> --payload '<JSON>' [--no-seed] [--pretty]");
    std::process::exit(2);
}
