//! Hash helpers – el algoritmo queda encapsulado aquí para poder cambiarlo
//! sin tocar el resto del core.

use serde_json::Value;

use super::to_canonical_json;

/// Hashea una cadena y devuelve hex.
pub fn hash_str(input: &str) -> String {
    blake3::hash(input.as_bytes()).to_hex().to_string()
}

/// Hashea un valor JSON por su forma canónica.
pub fn hash_value(value: &Value) -> String {
    hash_str(&to_canonical_json(value))
}
