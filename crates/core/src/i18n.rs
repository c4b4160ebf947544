//! Language selection and UI labels.

use serde::{Deserialize, Serialize};

use crate::catalog::SortKey;
use crate::models::StoreStatus;

/// Interface language, remembered per visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    pub const ALL: [Self; 2] = [Self::En, Self::Es];

    /// ISO 639-1 code, used in `<html lang>` and the language switcher.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }

    /// Name of the language in itself.
    #[must_use]
    pub const fn native_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Es => "Español",
        }
    }

    #[must_use]
    pub const fn labels(self) -> &'static Labels {
        match self {
            Self::En => &EN,
            Self::Es => &ES,
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "es" => Ok(Self::Es),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}

/// Static UI strings for one language.
#[derive(Debug, PartialEq, Eq)]
pub struct Labels {
    pub nav_home: &'static str,
    pub nav_catalog: &'static str,
    pub nav_stores: &'static str,
    pub nav_cart: &'static str,
    pub nav_favorites: &'static str,
    pub nav_profile: &'static str,
    pub nav_login: &'static str,
    pub nav_logout: &'static str,
    pub nav_register: &'static str,

    pub featured: &'static str,
    pub best_sellers: &'static str,
    pub add_to_cart: &'static str,
    pub add_favorite: &'static str,
    pub remove_favorite: &'static str,

    pub search_placeholder: &'static str,
    pub all_categories: &'static str,
    pub min_price: &'static str,
    pub max_price: &'static str,
    pub cities: &'static str,
    pub sort_by: &'static str,
    pub apply_filters: &'static str,
    pub reset_filters: &'static str,
    pub no_results: &'static str,

    pub cart_title: &'static str,
    pub cart_empty: &'static str,
    pub quantity: &'static str,
    pub total: &'static str,
    pub update: &'static str,
    pub remove: &'static str,
    pub clear: &'static str,

    pub favorites_title: &'static str,
    pub favorites_empty: &'static str,

    pub stores_title: &'static str,
    pub all_cities: &'static str,
    pub open_now: &'static str,
    pub on_break: &'static str,
    pub closed: &'static str,
    pub day_off: &'static str,

    pub login_title: &'static str,
    pub register_title: &'static str,
    pub verify_title: &'static str,
    pub name: &'static str,
    pub email: &'static str,
    pub password: &'static str,
    pub code: &'static str,
    pub submit: &'static str,
    pub continue_with_google: &'static str,

    pub profile_title: &'static str,
    pub manage_stores: &'static str,
    pub manage_products: &'static str,
    pub manage_categories: &'static str,
    pub manage_users: &'static str,
    pub create: &'static str,
    pub edit: &'static str,
    pub save: &'static str,
    pub delete: &'static str,

    pub unauthorized_title: &'static str,
    pub unauthorized_body: &'static str,
    pub server_error: &'static str,
    pub network_error: &'static str,
    pub session_expired: &'static str,

    pub added_to_cart: &'static str,
    pub cart_updated: &'static str,
    pub favorites_updated: &'static str,
    pub saved: &'static str,
    pub deleted: &'static str,
    pub signed_in: &'static str,
    pub signed_out: &'static str,
    pub code_sent: &'static str,
    pub invalid_code: &'static str,
    pub invalid_form: &'static str,
    pub back_home: &'static str,
    pub view_details: &'static str,
    pub description: &'static str,
    pub price: &'static str,
    pub category: &'static str,
    pub city: &'static str,
    pub address: &'static str,
    pub phone: &'static str,
    pub hours: &'static str,
    pub open_at: &'static str,
    pub close_at: &'static str,
    pub break_time: &'static str,
    pub working_day: &'static str,
    pub image: &'static str,
    pub parent: &'static str,
    pub no_parent: &'static str,
    pub active: &'static str,
    pub store: &'static str,
    pub role: &'static str,
    pub status: &'static str,
    pub block: &'static str,
    pub unblock: &'static str,
    pub colors: &'static str,
    pub occasions: &'static str,
    pub comma_separated: &'static str,

    pub sort_featured: &'static str,
    pub sort_price_asc: &'static str,
    pub sort_price_desc: &'static str,
    pub sort_name_asc: &'static str,
    pub sort_newest: &'static str,
}

impl Labels {
    #[must_use]
    pub const fn for_language(language: Language) -> &'static Self {
        language.labels()
    }

    #[must_use]
    pub const fn sort(&self, key: SortKey) -> &'static str {
        match key {
            SortKey::Featured => self.sort_featured,
            SortKey::PriceAsc => self.sort_price_asc,
            SortKey::PriceDesc => self.sort_price_desc,
            SortKey::NameAsc => self.sort_name_asc,
            SortKey::Newest => self.sort_newest,
        }
    }

    #[must_use]
    pub const fn store_status(&self, status: StoreStatus) -> &'static str {
        match status {
            StoreStatus::Open => self.open_now,
            StoreStatus::OnBreak => self.on_break,
            StoreStatus::Closed => self.closed,
        }
    }
}

static EN: Labels = Labels {
    nav_home: "Home",
    nav_catalog: "Catalog",
    nav_stores: "Stores",
    nav_cart: "Cart",
    nav_favorites: "Favorites",
    nav_profile: "Profile",
    nav_login: "Sign in",
    nav_logout: "Sign out",
    nav_register: "Create account",

    featured: "Featured",
    best_sellers: "Best sellers",
    add_to_cart: "Add to cart",
    add_favorite: "Save to favorites",
    remove_favorite: "Remove from favorites",

    search_placeholder: "Search flowers",
    all_categories: "All categories",
    min_price: "Min price",
    max_price: "Max price",
    cities: "Cities",
    sort_by: "Sort by",
    apply_filters: "Apply",
    reset_filters: "Reset",
    no_results: "No flowers match these filters.",

    cart_title: "Your cart",
    cart_empty: "Your cart is empty.",
    quantity: "Quantity",
    total: "Total",
    update: "Update",
    remove: "Remove",
    clear: "Clear",

    favorites_title: "Favorites",
    favorites_empty: "You have no favorites yet.",

    stores_title: "Our stores",
    all_cities: "All cities",
    open_now: "Open now",
    on_break: "On break",
    closed: "Closed",
    day_off: "Day off",

    login_title: "Sign in",
    register_title: "Create account",
    verify_title: "Confirm your email",
    name: "Name",
    email: "Email",
    password: "Password",
    code: "Verification code",
    submit: "Continue",
    continue_with_google: "Continue with Google",

    profile_title: "Your profile",
    manage_stores: "Stores",
    manage_products: "Products",
    manage_categories: "Categories",
    manage_users: "Users",
    create: "Create",
    edit: "Edit",
    save: "Save",
    delete: "Delete",

    unauthorized_title: "Access denied",
    unauthorized_body: "Your account does not have access to this page.",
    server_error: "Something went wrong on our side. Please try again later.",
    network_error: "The shop is unreachable right now. Please try again.",
    session_expired: "Your session has expired. Please sign in again.",

    added_to_cart: "Added to your cart.",
    cart_updated: "Cart updated.",
    favorites_updated: "Favorites updated.",
    saved: "Saved.",
    deleted: "Deleted.",
    signed_in: "Welcome back!",
    signed_out: "You have been signed out.",
    code_sent: "We sent a code to your email.",
    invalid_code: "That code is not valid.",
    invalid_form: "Please check the highlighted fields.",
    back_home: "Back to the shop",
    view_details: "View details",
    description: "Description",
    price: "Price",
    category: "Category",
    city: "City",
    address: "Address",
    phone: "Phone",
    hours: "Opening hours",
    open_at: "Opens",
    close_at: "Closes",
    break_time: "Break",
    working_day: "Open this day",
    image: "Image",
    parent: "Parent category",
    no_parent: "None (top level)",
    active: "Active",
    store: "Store",
    role: "Role",
    status: "Status",
    block: "Block",
    unblock: "Unblock",
    colors: "Colors",
    occasions: "Occasions",
    comma_separated: "comma separated",

    sort_featured: "Featured",
    sort_price_asc: "Price: low to high",
    sort_price_desc: "Price: high to low",
    sort_name_asc: "Name",
    sort_newest: "Newest",
};

static ES: Labels = Labels {
    nav_home: "Inicio",
    nav_catalog: "Catálogo",
    nav_stores: "Tiendas",
    nav_cart: "Carrito",
    nav_favorites: "Favoritos",
    nav_profile: "Perfil",
    nav_login: "Iniciar sesión",
    nav_logout: "Cerrar sesión",
    nav_register: "Crear cuenta",

    featured: "Destacados",
    best_sellers: "Más vendidos",
    add_to_cart: "Añadir al carrito",
    add_favorite: "Guardar en favoritos",
    remove_favorite: "Quitar de favoritos",

    search_placeholder: "Buscar flores",
    all_categories: "Todas las categorías",
    min_price: "Precio mínimo",
    max_price: "Precio máximo",
    cities: "Ciudades",
    sort_by: "Ordenar por",
    apply_filters: "Aplicar",
    reset_filters: "Restablecer",
    no_results: "Ninguna flor coincide con estos filtros.",

    cart_title: "Tu carrito",
    cart_empty: "Tu carrito está vacío.",
    quantity: "Cantidad",
    total: "Total",
    update: "Actualizar",
    remove: "Quitar",
    clear: "Vaciar",

    favorites_title: "Favoritos",
    favorites_empty: "Aún no tienes favoritos.",

    stores_title: "Nuestras tiendas",
    all_cities: "Todas las ciudades",
    open_now: "Abierto ahora",
    on_break: "En descanso",
    closed: "Cerrado",
    day_off: "Día libre",

    login_title: "Iniciar sesión",
    register_title: "Crear cuenta",
    verify_title: "Confirma tu correo",
    name: "Nombre",
    email: "Correo electrónico",
    password: "Contraseña",
    code: "Código de verificación",
    submit: "Continuar",
    continue_with_google: "Continuar con Google",

    profile_title: "Tu perfil",
    manage_stores: "Tiendas",
    manage_products: "Productos",
    manage_categories: "Categorías",
    manage_users: "Usuarios",
    create: "Crear",
    edit: "Editar",
    save: "Guardar",
    delete: "Eliminar",

    unauthorized_title: "Acceso denegado",
    unauthorized_body: "Tu cuenta no tiene acceso a esta página.",
    server_error: "Algo salió mal de nuestro lado. Inténtalo más tarde.",
    network_error: "La tienda no está disponible ahora. Inténtalo de nuevo.",
    session_expired: "Tu sesión ha expirado. Inicia sesión de nuevo.",

    added_to_cart: "Añadido al carrito.",
    cart_updated: "Carrito actualizado.",
    favorites_updated: "Favoritos actualizados.",
    saved: "Guardado.",
    deleted: "Eliminado.",
    signed_in: "¡Bienvenido de nuevo!",
    signed_out: "Has cerrado sesión.",
    code_sent: "Te enviamos un código por correo.",
    invalid_code: "Ese código no es válido.",
    invalid_form: "Revisa los campos indicados.",
    back_home: "Volver a la tienda",
    view_details: "Ver detalles",
    description: "Descripción",
    price: "Precio",
    category: "Categoría",
    city: "Ciudad",
    address: "Dirección",
    phone: "Teléfono",
    hours: "Horario",
    open_at: "Abre",
    close_at: "Cierra",
    break_time: "Descanso",
    working_day: "Abierto este día",
    image: "Imagen",
    parent: "Categoría superior",
    no_parent: "Ninguna (nivel superior)",
    active: "Activa",
    store: "Tienda",
    role: "Rol",
    status: "Estado",
    block: "Bloquear",
    unblock: "Desbloquear",
    colors: "Colores",
    occasions: "Ocasiones",
    comma_separated: "separados por comas",

    sort_featured: "Destacados",
    sort_price_asc: "Precio: menor a mayor",
    sort_price_desc: "Precio: mayor a menor",
    sort_name_asc: "Nombre",
    sort_newest: "Más recientes",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language() {
        assert_eq!("ES".parse::<Language>(), Ok(Language::Es));
        assert_eq!(" en ".parse::<Language>(), Ok(Language::En));
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_every_language_has_distinct_labels() {
        assert_ne!(Language::En.labels(), Language::Es.labels());
        for language in Language::ALL {
            assert!(!language.labels().add_to_cart.is_empty());
        }
    }

    #[test]
    fn test_sort_labels() {
        assert_eq!(Language::En.labels().sort(SortKey::Newest), "Newest");
        assert_eq!(
            Language::Es.labels().store_status(StoreStatus::Closed),
            "Cerrado"
        );
    }
}
