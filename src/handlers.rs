use std::sync::Arc;

use axum::{
    extract::{Path, Query, RawQuery},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Redirect},
    Extension, Json,
};
use sqlx::SqlitePool;
use tracing::info;

use crate::{
    authentication::{
        get_jwt_token, hash_password_argon2, verify_password_argon2, AuthUser, MaybeUser,
    },
    config::Config,
    data_formats::{
        parse_query_pairs, CreateRecipeRequest, FollowedAuthorResponse, IngredientQueryParams,
        IngredientResponse, LoginRequest, Page, PageLinks, PageQueryParams, Pagination,
        ProfileResponse, RecipeQueryParams, RecipeResponse, RegisterRequest, ShortLinkResponse,
        ShortRecipeResponse, SubscriptionQueryParams, TagResponse, TokenResponse,
        UpdateRecipeRequest, UserResponse,
    },
    db_helpers::{
        add_relation, create_recipe_in_db, delete_recipe_in_db, get_cart_lines_in_db,
        get_ingredient_in_db, get_profile_in_db, get_recipe_author_in_db, get_recipe_in_db,
        get_short_recipe_in_db, get_tag_in_db, get_tags_in_db, get_user_by_email, insert_user,
        list_profiles_in_db, list_recipes_in_db, list_subscriptions_in_db, remove_relation,
        search_ingredients_in_db, update_recipe_in_db, CartItem, Favorite, Follow,
    },
    errors::RequestError,
    filters::RecipeFilter,
    shopping_list::{Clock, ShoppingList},
};

type HandlerResult<T> = Result<T, RequestError>;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> Result<(), (StatusCode, String)> {
    Err((
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    ))
}

// ----------------- User Handlers -----------------
pub async fn register_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<RegisterRequest>,
) -> HandlerResult<impl IntoResponse> {
    request.validate()?;
    let password_hash = hash_password_argon2(request.password.clone())
        .await
        .map_err(|_| RequestError::ServerError)?;
    let user = insert_user(&pool, &request, &password_hash).await?;
    info!(user_id = user.id, "user registered");
    Ok((StatusCode::CREATED, Json(UserResponse::new(user))))
}

pub async fn login_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<LoginRequest>,
) -> HandlerResult<Json<TokenResponse>> {
    const BAD_CREDENTIALS: &str = "Unable to log in with provided credentials.";

    let user = match get_user_by_email(&pool, &request.email).await? {
        Some(user) => user,
        None => return Err(RequestError::Validation(BAD_CREDENTIALS.into())),
    };
    let is_password_correct = verify_password_argon2(request.password, user.password)
        .await
        .map_err(|_| RequestError::ServerError)?;
    if !is_password_correct {
        return Err(RequestError::Validation(BAD_CREDENTIALS.into()));
    }
    let auth_token = get_jwt_token(user.id).map_err(|_| RequestError::ServerError)?;
    Ok(Json(TokenResponse { auth_token }))
}

pub async fn get_current_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
) -> HandlerResult<Json<ProfileResponse>> {
    let profile = get_profile_in_db(&pool, Some(user.id), user.id)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;
    Ok(Json(profile.into()))
}

pub async fn list_users(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(config): Extension<Arc<Config>>,
    maybe_user: MaybeUser,
    Query(params): Query<PageQueryParams>,
    RawQuery(raw): RawQuery,
) -> HandlerResult<Json<Page<ProfileResponse>>> {
    let pagination = Pagination::new(params.page, params.limit)?;
    let (profiles, count) = list_profiles_in_db(&pool, maybe_user.get_id(), pagination).await?;
    pagination.check_in_range(count)?;
    let links = PageLinks::new(&config.public_url, "/users", parse_query_pairs(raw.as_deref())?);
    let results = profiles.into_iter().map(ProfileResponse::from).collect();
    Ok(Json(Page::new(results, count, pagination, &links)))
}

pub async fn get_user_profile(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(id): Path<i64>,
) -> HandlerResult<Json<ProfileResponse>> {
    let profile = get_profile_in_db(&pool, maybe_user.get_id(), id)
        .await?
        .ok_or(RequestError::NotFound("User not found"))?;
    Ok(Json(profile.into()))
}

// ----------------- Subscription Handlers -----------------
pub async fn list_subscriptions(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(config): Extension<Arc<Config>>,
    user: AuthUser,
    Query(params): Query<SubscriptionQueryParams>,
    RawQuery(raw): RawQuery,
) -> HandlerResult<Json<Page<FollowedAuthorResponse>>> {
    let pagination = Pagination::new(params.page, params.limit)?;
    let (authors, count) =
        list_subscriptions_in_db(&pool, user.id, pagination, params.recipes_limit()).await?;
    pagination.check_in_range(count)?;
    let links = PageLinks::new(
        &config.public_url,
        "/users/subscriptions",
        parse_query_pairs(raw.as_deref())?,
    );
    let results = authors
        .into_iter()
        .map(FollowedAuthorResponse::new)
        .collect();
    Ok(Json(Page::new(results, count, pagination, &links)))
}

pub async fn subscribe_to_author(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(author_id): Path<i64>,
    Query(params): Query<SubscriptionQueryParams>,
) -> HandlerResult<impl IntoResponse> {
    let relation =
        add_relation::<Follow>(&pool, user.id, author_id, &params.recipes_limit()).await?;
    Ok((
        StatusCode::CREATED,
        Json(FollowedAuthorResponse::new(relation.target)),
    ))
}

pub async fn unsubscribe_from_author(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(author_id): Path<i64>,
) -> HandlerResult<StatusCode> {
    remove_relation::<Follow>(&pool, user.id, author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------- Catalogue Handlers -----------------
pub async fn list_tags(
    Extension(pool): Extension<Arc<SqlitePool>>,
) -> HandlerResult<Json<Vec<TagResponse>>> {
    let tags = get_tags_in_db(&pool).await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

pub async fn get_tag(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> HandlerResult<Json<TagResponse>> {
    let tag = get_tag_in_db(&pool, id)
        .await?
        .ok_or(RequestError::NotFound("Tag not found"))?;
    Ok(Json(tag.into()))
}

pub async fn list_ingredients(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Query(params): Query<IngredientQueryParams>,
) -> HandlerResult<Json<Vec<IngredientResponse>>> {
    let ingredients = search_ingredients_in_db(&pool, params.name.as_deref()).await?;
    Ok(Json(
        ingredients
            .into_iter()
            .map(IngredientResponse::from)
            .collect(),
    ))
}

pub async fn get_ingredient(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> HandlerResult<Json<IngredientResponse>> {
    let ingredient = get_ingredient_in_db(&pool, id)
        .await?
        .ok_or(RequestError::NotFound("Ingredient not found"))?;
    Ok(Json(ingredient.into()))
}

// ----------------- Recipe Handlers -----------------
pub async fn list_recipes(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(config): Extension<Arc<Config>>,
    maybe_user: MaybeUser,
    RawQuery(raw): RawQuery,
) -> HandlerResult<Json<Page<RecipeResponse>>> {
    let pairs = parse_query_pairs(raw.as_deref())?;
    let params = RecipeQueryParams::from_pairs(&pairs)?;
    let pagination = params.pagination()?;
    let filter = RecipeFilter::new(&params, maybe_user.get_id());

    let (recipes, count) =
        list_recipes_in_db(&pool, maybe_user.get_id(), &filter, pagination).await?;
    let links = PageLinks::new(&config.public_url, "/recipes", pairs);
    let results = recipes.into_iter().map(RecipeResponse::new).collect();
    Ok(Json(Page::new(results, count, pagination, &links)))
}

pub async fn get_recipe(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(id): Path<i64>,
) -> HandlerResult<Json<RecipeResponse>> {
    let recipe = get_recipe_in_db(&pool, maybe_user.get_id(), id)
        .await?
        .ok_or(RequestError::NotFound("Recipe not found"))?;
    Ok(Json(RecipeResponse::new(recipe)))
}

pub async fn create_recipe(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Json(request): Json<CreateRecipeRequest>,
) -> HandlerResult<impl IntoResponse> {
    let composition = request.validate()?;
    let recipe = create_recipe_in_db(&pool, user.id, request, composition).await?;
    info!(user_id = user.id, recipe_id = recipe.recipe.id, "recipe created");
    Ok((StatusCode::CREATED, Json(RecipeResponse::new(recipe))))
}

pub async fn update_recipe(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateRecipeRequest>,
) -> HandlerResult<Json<RecipeResponse>> {
    match get_recipe_author_in_db(&pool, id).await? {
        None => return Err(RequestError::NotFound("Recipe not found")),
        Some(author_id) if author_id != user.id => return Err(RequestError::Forbidden),
        Some(_) => {}
    }
    let composition = request.validate()?;
    let recipe = update_recipe_in_db(&pool, user.id, id, request, composition).await?;
    info!(user_id = user.id, recipe_id = id, "recipe updated");
    Ok(Json(RecipeResponse::new(recipe)))
}

pub async fn delete_recipe(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> HandlerResult<StatusCode> {
    delete_recipe_in_db(&pool, user.id, id).await?;
    info!(user_id = user.id, recipe_id = id, "recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_recipe_short_link(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(config): Extension<Arc<Config>>,
    Path(id): Path<i64>,
) -> HandlerResult<Json<ShortLinkResponse>> {
    get_short_recipe_in_db(&pool, id)
        .await?
        .ok_or(RequestError::NotFound("Recipe not found"))?;
    Ok(Json(ShortLinkResponse {
        short_link: format!("{}/s/{}", config.public_url, id),
    }))
}

pub async fn follow_short_link(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(id): Path<i64>,
) -> HandlerResult<Redirect> {
    get_short_recipe_in_db(&pool, id)
        .await?
        .ok_or(RequestError::NotFound("Recipe not found"))?;
    Ok(Redirect::to(&format!("/recipes/{id}")))
}

// ----------------- Favorite & Cart Handlers -----------------
pub async fn favorite_recipe(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> HandlerResult<impl IntoResponse> {
    let relation = add_relation::<Favorite>(&pool, user.id, id, &()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ShortRecipeResponse::from(relation.target)),
    ))
}

pub async fn unfavorite_recipe(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> HandlerResult<StatusCode> {
    remove_relation::<Favorite>(&pool, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_to_shopping_cart(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> HandlerResult<impl IntoResponse> {
    let relation = add_relation::<CartItem>(&pool, user.id, id, &()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ShortRecipeResponse::from(relation.target)),
    ))
}

pub async fn remove_from_shopping_cart(
    Extension(pool): Extension<Arc<SqlitePool>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> HandlerResult<StatusCode> {
    remove_relation::<CartItem>(&pool, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn download_shopping_cart(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Extension(clock): Extension<Arc<dyn Clock>>,
    user: AuthUser,
) -> HandlerResult<impl IntoResponse> {
    let shopping_list = ShoppingList::new(get_cart_lines_in_db(&pool, user.id).await?);
    info!(
        user_id = user.id,
        items = shopping_list.lines().len(),
        "shopping list exported"
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"shopping_list.txt\"",
            ),
        ],
        shopping_list.render(clock.as_ref()),
    ))
}
