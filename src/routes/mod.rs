pub mod health;
pub mod oauth;
pub mod todos;
pub mod users;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(users::signup)
            .service(users::login)
            .service(users::me)
            .service(users::update_me)
            .service(users::delete_me),
    )
    .service(
        // `/search` is registered before `/{id}` so it is not swallowed by
        // the id matcher.
        web::scope("/todos")
            .service(todos::search_todos)
            .service(todos::create_todo)
            .service(todos::list_todos)
            .service(todos::get_todo)
            .service(todos::update_todo)
            .service(todos::delete_todo),
    )
    .service(web::scope("/oauth2").service(oauth::authorize))
    .service(web::scope("/login/oauth2").service(oauth::callback));
}
