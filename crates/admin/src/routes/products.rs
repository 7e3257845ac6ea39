//! Product route handlers.
//!
//! The listing is public; create, edit, update and delete require a
//! logged-in session. Create and update take multipart forms because of the
//! image file field.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
};

use fernway_core::{Price, ProductId};

use crate::db::ProductRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{CurrentUser, Product};
use crate::services::imagekit::ImageKitClient;
use crate::services::products::{
    ImageUpload, ProductDraft, ProductFlowError, ProductService,
};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub products: Vec<Product>,
    pub user: Option<CurrentUser>,
}

/// Create form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/new.html")]
pub struct NewProductTemplate {
    pub error: Option<String>,
}

/// Edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/edit.html")]
pub struct EditProductTemplate {
    pub product: Product,
    pub error: Option<String>,
}

// =============================================================================
// Form Parsing
// =============================================================================

/// Fields of the multipart product form.
struct ProductForm {
    name: String,
    price_raw: String,
    description: String,
    image: Option<ImageUpload>,
}

impl ProductForm {
    /// Validate the scalar fields into a draft.
    fn draft(&self) -> Result<ProductDraft, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Name is required.".to_string());
        }

        let price = Price::parse(&self.price_raw).map_err(|e| format!("Invalid price: {e}"))?;

        Ok(ProductDraft {
            name: name.to_string(),
            description: self.description.trim().to_string(),
            price,
        })
    }
}

/// Read the product form fields out of a multipart body.
///
/// An image part with no bytes (file input left empty) counts as no image.
/// Unknown parts are ignored.
async fn read_product_form(mut multipart: Multipart) -> Result<ProductForm, AppError> {
    let mut form = ProductForm {
        name: String::new(),
        price_raw: String::new(),
        description: String::new(),
        image: None,
    };

    while let Some(field) = multipart.next_field().await? {
        let Some(field_name) = field.name().map(ToString::to_string) else {
            continue;
        };

        match field_name.as_str() {
            "name" => form.name = field.text().await?,
            "price" => form.price_raw = field.text().await?,
            "description" => form.description = field.text().await?,
            "image" => {
                let filename = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or("upload")
                    .to_string();
                let bytes = field.bytes().await?.to_vec();
                if !bytes.is_empty() {
                    form.image = Some(ImageUpload { bytes, filename });
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

// =============================================================================
// Handlers
// =============================================================================

fn product_service(state: &AppState) -> ProductService<ProductRepository<'_>, ImageKitClient> {
    ProductService::new(
        ProductRepository::new(state.pool()),
        state.imagekit().clone(),
        state.config().imagekit.upload_folder.clone(),
    )
}

/// Display the product listing, newest first.
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<ProductsTemplate, AppError> {
    let products = product_service(&state).list().await?;

    Ok(ProductsTemplate { products, user })
}

/// Display the create form.
pub async fn new_form(RequireAuth(_user): RequireAuth) -> impl IntoResponse {
    NewProductTemplate { error: None }
}

/// Handle the create form submission.
///
/// A missing image file re-renders the form; nothing is uploaded or
/// persisted. External failures also re-render rather than surfacing a
/// bare error page.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_product_form(multipart).await?;

    let draft = match form.draft() {
        Ok(draft) => draft,
        Err(message) => {
            return Ok(NewProductTemplate {
                error: Some(message),
            }
            .into_response());
        }
    };

    match product_service(&state).create(&draft, form.image).await {
        Ok(product) => {
            tracing::info!(
                product_id = %product.id,
                name = %product.name,
                user_id = %user.id,
                "Product created"
            );
            Ok(Redirect::to("/products").into_response())
        }
        Err(ProductFlowError::MissingImage) => Ok(NewProductTemplate {
            error: Some("An image file is required.".to_string()),
        }
        .into_response()),
        Err(e) => {
            tracing::error!(error = %e, "Product creation failed");
            Ok(NewProductTemplate {
                error: Some("Product creation failed.".to_string()),
            }
            .into_response())
        }
    }
}

/// Display the edit form for a product.
pub async fn edit_form(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<EditProductTemplate, AppError> {
    let product = product_service(&state).get(ProductId::new(id)).await?;

    Ok(EditProductTemplate {
        product,
        error: None,
    })
}

/// Handle the edit form submission (PUT via method override).
///
/// The image field is optional here; without one the stored image is kept.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let id = ProductId::new(id);
    let form = read_product_form(multipart).await?;
    let service = product_service(&state);

    let draft = match form.draft() {
        Ok(draft) => draft,
        Err(message) => {
            let product = service.get(id).await?;
            return Ok(EditProductTemplate {
                product,
                error: Some(message),
            }
            .into_response());
        }
    };

    match service.update(id, &draft, form.image).await {
        Ok(()) => {
            tracing::info!(product_id = %id, user_id = %user.id, "Product updated");
            Ok(Redirect::to("/products").into_response())
        }
        Err(ProductFlowError::NotFound) => Err(AppError::NotFound("product".to_string())),
        Err(e) => {
            tracing::error!(error = %e, product_id = %id, "Product update failed");
            let product = service.get(id).await?;
            Ok(EditProductTemplate {
                product,
                error: Some("Product update failed.".to_string()),
            }
            .into_response())
        }
    }
}

/// Handle product deletion (DELETE via method override).
///
/// Deleting a product that no longer exists still redirects to the listing.
pub async fn destroy(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Redirect, AppError> {
    let id = ProductId::new(id);
    product_service(&state).delete(id).await?;

    tracing::info!(product_id = %id, user_id = %user.id, "Product deleted");
    Ok(Redirect::to("/products"))
}
