use std::{ops::Deref, sync::Arc};

use crate::repository::BookRepository;

#[derive(Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    pub fn new(repository: BookRepository) -> Self {
        Self {
            inner: Arc::new(ApiStateInner { repository }),
        }
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct ApiStateInner {
    repository: BookRepository,
}

impl ApiStateInner {
    pub fn repository(&self) -> &BookRepository {
        &self.repository
    }
}
