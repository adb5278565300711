//! crates/hogarzen_core/src/catalog.rs
//!
//! The built-in household task catalog new users pick from.

use crate::domain::{TaskCategory, TaskPriority, TaskTemplate};

const fn template(
    id: &'static str,
    title: &'static str,
    description: &'static str,
    category: TaskCategory,
    priority: TaskPriority,
    icon: &'static str,
) -> TaskTemplate {
    TaskTemplate {
        id,
        title,
        description,
        category,
        priority,
        icon,
    }
}

pub const CATALOG: &[TaskTemplate] = &[
    template(
        "apagar-plancha",
        "Apagar la plancha",
        "Comprueba que la plancha está desenchufada antes de salir",
        TaskCategory::Seguridad,
        TaskPriority::Alta,
        "🔌",
    ),
    template(
        "cerrar-gas",
        "Cerrar la llave del gas",
        "Revisa la llave de paso del gas por la noche",
        TaskCategory::Seguridad,
        TaskPriority::Alta,
        "🔥",
    ),
    template(
        "cerrar-puerta",
        "Cerrar puertas y ventanas",
        "Asegura la casa antes de dormir o salir",
        TaskCategory::Seguridad,
        TaskPriority::Alta,
        "🔒",
    ),
    template(
        "fregar-platos",
        "Fregar los platos",
        "Deja la cocina recogida después de cada comida",
        TaskCategory::Cocina,
        TaskPriority::Media,
        "🍽️",
    ),
    template(
        "limpiar-nevera",
        "Limpiar la nevera",
        "Retira alimentos caducados y limpia las baldas",
        TaskCategory::Cocina,
        TaskPriority::Baja,
        "🧊",
    ),
    template(
        "barrer-suelo",
        "Barrer y fregar el suelo",
        "Pasa la escoba y la fregona por las zonas comunes",
        TaskCategory::Limpieza,
        TaskPriority::Media,
        "🧹",
    ),
    template(
        "limpiar-bano",
        "Limpiar el baño",
        "Lavabo, inodoro y ducha desinfectados",
        TaskCategory::Limpieza,
        TaskPriority::Media,
        "🚿",
    ),
    template(
        "sacar-basura",
        "Sacar la basura",
        "Separa el reciclaje y baja las bolsas",
        TaskCategory::Limpieza,
        TaskPriority::Alta,
        "🗑️",
    ),
    template(
        "poner-lavadora",
        "Poner la lavadora",
        "Separa ropa blanca y de color",
        TaskCategory::Lavanderia,
        TaskPriority::Media,
        "🧺",
    ),
    template(
        "lista-compra",
        "Hacer la lista de la compra",
        "Revisa la despensa y apunta lo que falta",
        TaskCategory::Compras,
        TaskPriority::Baja,
        "🛒",
    ),
    template(
        "revisar-detector",
        "Revisar el detector de humo",
        "Pulsa el botón de prueba y cambia la pila si hace falta",
        TaskCategory::Mantenimiento,
        TaskPriority::Media,
        "🚨",
    ),
    template(
        "regar-plantas",
        "Regar las plantas",
        "Riega las plantas de interior y del balcón",
        TaskCategory::Jardin,
        TaskPriority::Baja,
        "🪴",
    ),
    template(
        "alimentar-mascota",
        "Dar de comer a la mascota",
        "Comida y agua fresca",
        TaskCategory::Mascotas,
        TaskPriority::Alta,
        "🐾",
    ),
];

pub fn catalog() -> &'static [TaskTemplate] {
    CATALOG
}

pub fn find_template(id: &str) -> Option<&'static TaskTemplate> {
    CATALOG.iter().find(|template| template.id == id)
}
