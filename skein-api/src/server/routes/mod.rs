use crate::server::ServerRouter;

mod feeds;
mod users;

pub fn routes() -> ServerRouter {
    ServerRouter::new().merge(feeds::routes()).merge(users::routes())
}
