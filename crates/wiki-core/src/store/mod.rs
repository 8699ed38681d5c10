//! Store de registros multi-tabla en memoria.
//!
//! Rol en el sistema:
//! - Primitiva CRUD uniforme y agnóstica de tabla usada por todos los tools y
//!   por el motor de aprobaciones.
//! - Asigna identificadores por tabla de forma monótona: un id emitido jamás
//!   se reutiliza, aunque el registro haya sido borrado.
//! - Preserva el orden de inserción por tabla (`IndexMap`), que es el orden
//!   observable de todos los listados y filtros.
//! - No impone esquema ni claves foráneas; la correctitud referencial es
//!   responsabilidad del llamador.
//!
//! El store es síncrono (`&mut self`); la serialización de accesos
//! concurrentes vive en la capa de tools (un lock alrededor de cada sección
//! crítica completa).

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use log::debug;
use serde_json::Value;

use crate::errors::CoreError;
use crate::table::Table;

/// Registro plano: campo -> valor JSON.
pub type Record = serde_json::Map<String, Value>;

pub struct RecordStore {
    tables: HashMap<Table, IndexMap<String, Record>>,
    next_ids: HashMap<Table, u64>,
}

impl RecordStore {
    pub fn new() -> Self {
        let mut tables = HashMap::new();
        let mut next_ids = HashMap::new();
        for t in Table::ALL {
            tables.insert(t, IndexMap::new());
            next_ids.insert(t, 1);
        }
        Self { tables, next_ids }
    }

    fn table(&self, table: Table) -> &IndexMap<String, Record> {
        self.tables.get(&table).expect("tabla registrada en new()")
    }

    fn table_mut(&mut self, table: Table) -> &mut IndexMap<String, Record> {
        self.tables.get_mut(&table).expect("tabla registrada en new()")
    }

    /// Emite un id fresco para `table`, estrictamente mayor que todo id
    /// emitido antes para esa tabla (incluidos los de registros borrados).
    pub fn next_id(&mut self, table: Table) -> String {
        let counter = self.next_ids.get_mut(&table).expect("tabla registrada en new()");
        let id = counter.to_string();
        *counter += 1;
        id
    }

    /// Inserta `record` bajo `id`.
    ///
    /// Si el llamador trae un id numérico propio, el contador de la tabla se
    /// adelanta para que `next_id` nunca pueda colisionar con él.
    ///
    /// # Errores
    /// `CoreError::DuplicateKey` si `id` ya existe en la tabla.
    pub fn create(&mut self, table: Table, id: &str, record: Record) -> Result<(), CoreError> {
        if self.table(table).contains_key(id) {
            return Err(CoreError::DuplicateKey { table: table.as_str().to_string(),
                                                 id: id.to_string() });
        }
        if let Ok(n) = id.parse::<u64>() {
            let counter = self.next_ids.get_mut(&table).expect("tabla registrada en new()");
            if n >= *counter {
                *counter = n + 1;
            }
        }
        debug!("store: create {}/{}", table.as_str(), id);
        self.table_mut(table).insert(id.to_string(), record);
        Ok(())
    }

    /// Lookup exacto; la ausencia no es un error.
    pub fn get(&self, table: Table, id: &str) -> Option<Record> {
        self.table(table).get(id).cloned()
    }

    /// Fusiona `patch` sobre el registro existente (sobrescritura superficial
    /// campo a campo; los campos no mencionados se preservan) y devuelve el
    /// registro resultante.
    ///
    /// # Errores
    /// `CoreError::NotFound` si `id` no existe; la tabla queda intacta.
    pub fn update(&mut self, table: Table, id: &str, patch: Record) -> Result<Record, CoreError> {
        let entry = self.tables
                        .get_mut(&table)
                        .expect("tabla registrada en new()")
                        .get_mut(id)
                        .ok_or_else(|| CoreError::NotFound { table: table.as_str().to_string(),
                                                             id: id.to_string() })?;
        for (field, value) in patch {
            entry.insert(field, value);
        }
        debug!("store: update {}/{}", table.as_str(), id);
        Ok(entry.clone())
    }

    /// Elimina el registro de forma permanente (sin tombstones). El id queda
    /// quemado: nunca volverá a emitirse para esta tabla.
    ///
    /// # Errores
    /// `CoreError::NotFound` si `id` no existe.
    pub fn delete(&mut self, table: Table, id: &str) -> Result<(), CoreError> {
        // shift_remove: el resto de la tabla conserva su orden de inserción.
        self.table_mut(table)
            .shift_remove(id)
            .ok_or_else(|| CoreError::NotFound { table: table.as_str().to_string(),
                                                 id: id.to_string() })?;
        debug!("store: delete {}/{}", table.as_str(), id);
        Ok(())
    }

    /// Primer registro cuyo campo `field` vale `value`, en orden de
    /// inserción.
    pub fn find_by_field(&self, table: Table, field: &str, value: &Value) -> Option<Record> {
        self.table(table).values().find(|r| r.get(field) == Some(value)).cloned()
    }

    /// Todos los registros cuyo campo `field` vale `value`, en orden de
    /// inserción.
    pub fn find_all_by_field(&self, table: Table, field: &str, value: &Value) -> Vec<Record> {
        self.table(table).values().filter(|r| r.get(field) == Some(value)).cloned().collect()
    }

    /// Filtro multi-campo permisivo: un registro pasa si, para cada par
    /// `(campo, valor)`, O BIEN carece del campo por completo O BIEN el campo
    /// es igual al valor. Un mapa de filtros vacío devuelve la tabla entera.
    ///
    /// La regla "campo ausente pasa" es deliberada: varios tools de reporte
    /// dependen de que los registros heterogéneos no queden fuera por no
    /// declarar un campo.
    pub fn filter_records(&self, table: Table, filters: &Record) -> Vec<Record> {
        self.table(table)
            .values()
            .filter(|r| filters.iter().all(|(field, value)| match r.get(field) {
                        None => true,
                        Some(actual) => actual == value,
                    }))
            .cloned()
            .collect()
    }

    /// Tabla completa en orden de inserción.
    pub fn all_records(&self, table: Table) -> Vec<Record> {
        self.table(table).values().cloned().collect()
    }

    pub fn len(&self, table: Table) -> usize {
        self.table(table).len()
    }

    pub fn is_empty(&self, table: Table) -> bool {
        self.table(table).is_empty()
    }

    /// Instante actual del reloj lógico.
    pub fn timestamp(&self) -> DateTime<Utc> {
        Utc::now()
    }

    /// Instante actual ya serializado en el formato fijo con el que se
    /// estampan `created_at`/`updated_at`/`decided_at` en los registros.
    pub fn timestamp_string(&self) -> String {
        self.timestamp().to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn ids_monotonicos_incluso_tras_borrados() {
        let mut store = RecordStore::new();
        let a = store.next_id(Table::Pages);
        store.create(Table::Pages, &a, record(&[("title", json!("uno"))])).unwrap();
        store.delete(Table::Pages, &a).unwrap();
        let b = store.next_id(Table::Pages);
        assert_ne!(a, b);
        assert!(b.parse::<u64>().unwrap() > a.parse::<u64>().unwrap());
    }

    #[test]
    fn create_con_id_externo_adelanta_el_contador() {
        let mut store = RecordStore::new();
        store.create(Table::Users, "7", record(&[("username", json!("ana"))])).unwrap();
        let next = store.next_id(Table::Users);
        assert_eq!(next, "8");
    }

    #[test]
    fn create_duplicado_falla() {
        let mut store = RecordStore::new();
        let id = store.next_id(Table::Users);
        store.create(Table::Users, &id, Record::new()).unwrap();
        let err = store.create(Table::Users, &id, Record::new()).unwrap_err();
        assert_eq!(err.kind(), "duplicate_key");
    }

    #[test]
    fn roundtrip_create_get_delete() {
        let mut store = RecordStore::new();
        let id = store.next_id(Table::Spaces);
        let rec = record(&[("key", json!("ENG")), ("name", json!("Engineering"))]);
        store.create(Table::Spaces, &id, rec.clone()).unwrap();
        assert_eq!(store.get(Table::Spaces, &id), Some(rec));
        store.delete(Table::Spaces, &id).unwrap();
        assert_eq!(store.get(Table::Spaces, &id), None);
    }

    #[test]
    fn update_fusiona_superficialmente_y_preserva_campos() {
        let mut store = RecordStore::new();
        let id = store.next_id(Table::Pages);
        store.create(Table::Pages, &id, record(&[("title", json!("v1")), ("body", json!("texto"))]))
             .unwrap();
        let merged = store.update(Table::Pages, &id, record(&[("title", json!("v2"))])).unwrap();
        assert_eq!(merged.get("title"), Some(&json!("v2")));
        // el campo no mencionado en el patch sobrevive
        assert_eq!(merged.get("body"), Some(&json!("texto")));
    }

    #[test]
    fn update_inexistente_no_escribe_nada() {
        let mut store = RecordStore::new();
        let err = store.update(Table::Pages, "99", record(&[("title", json!("x"))])).unwrap_err();
        assert_eq!(err.kind(), "not_found");
        assert!(store.is_empty(Table::Pages));
    }

    #[test]
    fn find_by_field_respeta_orden_de_insercion() {
        let mut store = RecordStore::new();
        for name in ["ana", "bruno", "ana"] {
            let id = store.next_id(Table::Users);
            store.create(Table::Users, &id, record(&[("username", json!(name)), ("id", json!(id.clone()))]))
                 .unwrap();
        }
        let first = store.find_by_field(Table::Users, "username", &json!("ana")).unwrap();
        assert_eq!(first.get("id"), Some(&json!("1")));
        let all = store.find_all_by_field(Table::Users, "username", &json!("ana"));
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn filtro_vacio_devuelve_todo_en_orden() {
        let mut store = RecordStore::new();
        for n in 0..3 {
            let id = store.next_id(Table::Notifications);
            store.create(Table::Notifications, &id, record(&[("n", json!(n))])).unwrap();
        }
        let all = store.filter_records(Table::Notifications, &Record::new());
        assert_eq!(all.len(), 3);
        let ns: Vec<_> = all.iter().map(|r| r.get("n").cloned().unwrap()).collect();
        assert_eq!(ns, vec![json!(0), json!(1), json!(2)]);
    }

    #[test]
    fn filtro_con_campo_ausente_pasa() {
        let mut store = RecordStore::new();
        let id = store.next_id(Table::Pages);
        // registro sin el campo `status`
        store.create(Table::Pages, &id, record(&[("title", json!("sin estado"))])).unwrap();
        let id2 = store.next_id(Table::Pages);
        store.create(Table::Pages, &id2, record(&[("title", json!("borrador")), ("status", json!("draft"))]))
             .unwrap();
        let id3 = store.next_id(Table::Pages);
        store.create(Table::Pages, &id3, record(&[("title", json!("publicada")), ("status", json!("published"))]))
             .unwrap();

        let matched = store.filter_records(Table::Pages, &record(&[("status", json!("draft"))]));
        // el registro sin `status` también pasa (política permisiva)
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].get("title"), Some(&json!("sin estado")));
        assert_eq!(matched[1].get("title"), Some(&json!("borrador")));
    }

    #[test]
    fn delete_preserva_orden_del_resto() {
        let mut store = RecordStore::new();
        for name in ["a", "b", "c"] {
            let id = store.next_id(Table::Groups);
            store.create(Table::Groups, &id, record(&[("name", json!(name))])).unwrap();
        }
        store.delete(Table::Groups, "2").unwrap();
        let names: Vec<_> = store.all_records(Table::Groups)
                                 .iter()
                                 .map(|r| r.get("name").cloned().unwrap())
                                 .collect();
        assert_eq!(names, vec![json!("a"), json!("c")]);
    }

    #[test]
    fn timestamp_string_formato_fijo() {
        let store = RecordStore::new();
        let ts = store.timestamp_string();
        // RFC 3339 UTC con sufijo Z y microsegundos
        assert!(ts.ends_with('Z'), "timestamp debe ser UTC: {ts}");
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
