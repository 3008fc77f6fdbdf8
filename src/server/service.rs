use may_minihttp::{HttpService, Request, Response};
use std::io;
use std::sync::Arc;

use super::request::parse_request;
use super::response::write_response;
use crate::engine::RouteTable;

/// `HttpService` adapter over a sealed [`RouteTable`].
///
/// `may_minihttp` clones the service per connection; clones share the table.
#[derive(Clone)]
pub struct AppService {
    table: Arc<RouteTable>,
}

impl AppService {
    #[must_use]
    pub fn new(table: Arc<RouteTable>) -> Self {
        Self { table }
    }

    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let request = parse_request(req);
        let response = self.table.handle(request);
        write_response(res, response);
        Ok(())
    }
}
