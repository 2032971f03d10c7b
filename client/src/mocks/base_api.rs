//! In-memory Base API.

use crate::error::{ApiError, Result};
use crate::provider::BaseApi;
use crate::types::{
    Credentials, Email, File, Image, ListMessage, MailingList, NewUser, Page, Upload, User,
    UserUpdate,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Records per page returned by the mock listings.
pub const PER_PAGE: usize = 10;

/// One call received by [`MockBaseApi`], with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    /// `users.create`
    CreateUser(NewUser),
    /// `users.get`
    GetUser {
        /// Requested id.
        id: String,
    },
    /// `users.list`
    ListUsers {
        /// Requested page.
        page: i64,
    },
    /// `users.update`
    UpdateUser {
        /// Target id.
        id: String,
        /// New values.
        update: UserUpdate,
    },
    /// `users.delete`
    DeleteUser {
        /// Target id.
        id: String,
    },
    /// `sessions.authenticate`
    Authenticate(Credentials),
    /// `emails.send`
    SendEmail(Email),
    /// `files.create`
    CreateFile(Upload),
    /// `files.get`
    GetFile {
        /// Requested id.
        id: String,
    },
    /// `files.list`
    ListFiles {
        /// Requested page.
        page: i64,
    },
    /// `files.delete`
    DeleteFile {
        /// Target id.
        id: String,
    },
    /// `images.create`
    CreateImage(Upload),
    /// `images.get`
    GetImage {
        /// Requested id.
        id: String,
    },
    /// `images.list`
    ListImages {
        /// Requested page.
        page: i64,
    },
    /// `images.delete`
    DeleteImage {
        /// Target id.
        id: String,
    },
    /// `mailingLists.list`
    ListMailingLists {
        /// Requested page.
        page: i64,
    },
    /// `mailingLists.get`
    GetMailingList {
        /// Requested id.
        id: String,
    },
    /// `mailingLists.subscribe`
    Subscribe {
        /// List id.
        id: String,
        /// Address to add.
        email: String,
    },
    /// `mailingLists.unsubscribe`
    Unsubscribe {
        /// List id.
        id: String,
        /// Address to remove.
        email: String,
    },
    /// `mailingLists.send`
    SendToMailingList {
        /// List id.
        id: String,
        /// Message sent.
        message: ListMessage,
    },
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password: String,
}

#[derive(Debug, Default)]
struct MockState {
    next_id: u64,
    users: Vec<StoredUser>,
    files: Vec<File>,
    images: Vec<Image>,
    mailing_lists: Vec<MailingList>,
    emails: Vec<Email>,
    list_messages: Vec<(String, ListMessage)>,
    uploaded_bytes: Vec<usize>,
    calls: Vec<ApiCall>,
    failures: VecDeque<ApiError>,
}

impl MockState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn user_index(&self, id: &str) -> Result<usize> {
        self.users
            .iter()
            .position(|stored| stored.user.id == id)
            .ok_or_else(|| ApiError::unknown(format!("user {id} not found")))
    }

    fn mailing_list_mut(&mut self, id: &str) -> Result<&mut MailingList> {
        self.mailing_lists
            .iter_mut()
            .find(|list| list.id == id)
            .ok_or_else(|| ApiError::unknown(format!("mailing list {id} not found")))
    }
}

/// Mock Base API.
///
/// Clones share state, so a test can keep one handle while the router owns
/// another.
#[derive(Debug, Clone, Default)]
pub struct MockBaseApi {
    state: Arc<Mutex<MockState>>,
}

impl MockBaseApi {
    /// Create an empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `call`, then either fail with a queued failure or hand back
    /// the state for the operation itself.
    fn begin(&self, call: ApiCall) -> Result<MutexGuard<'_, MockState>> {
        let mut state = self.lock();
        state.calls.push(call);
        match state.failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }

    /// Make the next call fail with `error`, whatever it is.
    pub fn fail_next(&self, error: ApiError) {
        self.lock().failures.push_back(error);
    }

    /// Seed a registered user.
    pub fn with_user(&self, email: &str, password: &str) -> User {
        let mut state = self.lock();
        let user = User {
            id: state.next_id("user"),
            email: email.to_string(),
            custom_data: None,
        };
        state.users.push(StoredUser {
            user: user.clone(),
            password: password.to_string(),
        });
        user
    }

    /// Seed a mailing list.
    pub fn with_mailing_list(&self, name: &str) -> MailingList {
        let mut state = self.lock();
        let list = MailingList {
            id: state.next_id("list"),
            name: Some(name.to_string()),
            subscribers: Vec::new(),
        };
        state.mailing_lists.push(list.clone());
        list
    }

    /// Every call received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Currently stored user with `id`.
    #[must_use]
    pub fn user(&self, id: &str) -> Option<User> {
        let state = self.lock();
        state
            .users
            .iter()
            .find(|stored| stored.user.id == id)
            .map(|stored| stored.user.clone())
    }

    /// Currently stored mailing list with `id`.
    #[must_use]
    pub fn mailing_list(&self, id: &str) -> Option<MailingList> {
        self.lock()
            .mailing_lists
            .iter()
            .find(|list| list.id == id)
            .cloned()
    }

    /// Stored files.
    #[must_use]
    pub fn files(&self) -> Vec<File> {
        self.lock().files.clone()
    }

    /// Emails accepted by `send_email`.
    #[must_use]
    pub fn sent_emails(&self) -> Vec<Email> {
        self.lock().emails.clone()
    }

    /// Messages accepted by `send_to_mailing_list`, with their list id.
    #[must_use]
    pub fn list_messages(&self) -> Vec<(String, ListMessage)> {
        self.lock().list_messages.clone()
    }

    /// Size of each upload, read from disk at call time.
    #[must_use]
    pub fn uploaded_bytes(&self) -> Vec<usize> {
        self.lock().uploaded_bytes.clone()
    }
}

fn paginate<T: Clone>(items: &[T], page: i64) -> Page<T> {
    let index = usize::try_from(page.max(1) - 1).unwrap_or(0);
    let total = u64::try_from(items.len()).ok();
    let items = items
        .iter()
        .skip(index.saturating_mul(PER_PAGE))
        .take(PER_PAGE)
        .cloned()
        .collect();

    Page {
        items,
        page,
        per_page: u32::try_from(PER_PAGE).ok(),
        total,
    }
}

fn read_upload(upload: &Upload) -> Result<usize> {
    std::fs::read(&upload.path)
        .map(|bytes| bytes.len())
        .map_err(|e| ApiError::unknown(format!("cannot read upload: {e}")))
}

impl BaseApi for MockBaseApi {
    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let mut state = self.begin(ApiCall::CreateUser(user.clone()))?;

        if user.email.trim().is_empty() {
            return Err(ApiError::invalid_request("Email can't be blank"));
        }
        if user.password != user.confirmation {
            return Err(ApiError::invalid_request(
                "Password confirmation does not match",
            ));
        }
        if state.users.iter().any(|stored| stored.user.email == user.email) {
            return Err(ApiError::invalid_request("Email is already taken"));
        }

        let created = User {
            id: state.next_id("user"),
            email: user.email.clone(),
            custom_data: user.custom_data.clone(),
        };
        state.users.push(StoredUser {
            user: created.clone(),
            password: user.password.clone(),
        });
        Ok(created)
    }

    async fn get_user(&self, id: &str) -> Result<User> {
        let state = self.begin(ApiCall::GetUser { id: id.to_string() })?;
        let index = state.user_index(id)?;
        Ok(state.users[index].user.clone())
    }

    async fn list_users(&self, page: i64) -> Result<Page<User>> {
        let state = self.begin(ApiCall::ListUsers { page })?;
        let users: Vec<User> = state.users.iter().map(|s| s.user.clone()).collect();
        Ok(paginate(&users, page))
    }

    async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<User> {
        let mut state = self.begin(ApiCall::UpdateUser {
            id: id.to_string(),
            update: update.clone(),
        })?;

        if update.email.trim().is_empty() {
            return Err(ApiError::invalid_request("Email can't be blank"));
        }

        let index = state.user_index(id)?;
        let user = &mut state.users[index].user;
        user.email.clone_from(&update.email);
        user.custom_data.clone_from(&update.custom_data);
        Ok(user.clone())
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        let mut state = self.begin(ApiCall::DeleteUser { id: id.to_string() })?;
        let index = state.user_index(id)?;
        state.users.remove(index);
        Ok(())
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<User> {
        let state = self.begin(ApiCall::Authenticate(credentials.clone()))?;
        state
            .users
            .iter()
            .find(|stored| {
                stored.user.email == credentials.email && stored.password == credentials.password
            })
            .map(|stored| stored.user.clone())
            .ok_or(ApiError::Unauthorized)
    }

    async fn send_email(&self, email: &Email) -> Result<()> {
        let mut state = self.begin(ApiCall::SendEmail(email.clone()))?;
        if email.to.trim().is_empty() {
            return Err(ApiError::invalid_request("Recipient can't be blank"));
        }
        state.emails.push(email.clone());
        Ok(())
    }

    async fn create_file(&self, upload: &Upload) -> Result<File> {
        let size = read_upload(upload);
        let mut state = self.begin(ApiCall::CreateFile(upload.clone()))?;
        let size = size?;

        let file = File {
            id: state.next_id("file"),
            content_type: upload.content_type.clone(),
            name: Some(upload.filename.clone()),
        };
        state.files.push(file.clone());
        state.uploaded_bytes.push(size);
        Ok(file)
    }

    async fn get_file(&self, id: &str) -> Result<File> {
        let state = self.begin(ApiCall::GetFile { id: id.to_string() })?;
        state
            .files
            .iter()
            .find(|file| file.id == id)
            .cloned()
            .ok_or_else(|| ApiError::unknown(format!("file {id} not found")))
    }

    async fn list_files(&self, page: i64) -> Result<Page<File>> {
        let state = self.begin(ApiCall::ListFiles { page })?;
        Ok(paginate(&state.files, page))
    }

    async fn delete_file(&self, id: &str) -> Result<()> {
        let mut state = self.begin(ApiCall::DeleteFile { id: id.to_string() })?;
        let before = state.files.len();
        state.files.retain(|file| file.id != id);
        if state.files.len() == before {
            return Err(ApiError::unknown(format!("file {id} not found")));
        }
        Ok(())
    }

    async fn create_image(&self, upload: &Upload) -> Result<Image> {
        let size = read_upload(upload);
        let mut state = self.begin(ApiCall::CreateImage(upload.clone()))?;
        let size = size?;

        if !upload.content_type.starts_with("image/") {
            return Err(ApiError::invalid_request(format!(
                "{} is not an image",
                upload.content_type
            )));
        }

        let image = Image {
            id: state.next_id("image"),
            content_type: Some(upload.content_type.clone()),
        };
        state.images.push(image.clone());
        state.uploaded_bytes.push(size);
        Ok(image)
    }

    async fn get_image(&self, id: &str) -> Result<Image> {
        let state = self.begin(ApiCall::GetImage { id: id.to_string() })?;
        state
            .images
            .iter()
            .find(|image| image.id == id)
            .cloned()
            .ok_or_else(|| ApiError::unknown(format!("image {id} not found")))
    }

    async fn list_images(&self, page: i64) -> Result<Page<Image>> {
        let state = self.begin(ApiCall::ListImages { page })?;
        Ok(paginate(&state.images, page))
    }

    async fn delete_image(&self, id: &str) -> Result<()> {
        let mut state = self.begin(ApiCall::DeleteImage { id: id.to_string() })?;
        let before = state.images.len();
        state.images.retain(|image| image.id != id);
        if state.images.len() == before {
            return Err(ApiError::unknown(format!("image {id} not found")));
        }
        Ok(())
    }

    async fn list_mailing_lists(&self, page: i64) -> Result<Page<MailingList>> {
        let state = self.begin(ApiCall::ListMailingLists { page })?;
        Ok(paginate(&state.mailing_lists, page))
    }

    async fn get_mailing_list(&self, id: &str) -> Result<MailingList> {
        let mut state = self.begin(ApiCall::GetMailingList { id: id.to_string() })?;
        state.mailing_list_mut(id).map(|list| list.clone())
    }

    async fn subscribe(&self, id: &str, email: &str) -> Result<MailingList> {
        let mut state = self.begin(ApiCall::Subscribe {
            id: id.to_string(),
            email: email.to_string(),
        })?;

        if email.trim().is_empty() {
            return Err(ApiError::invalid_request("Email can't be blank"));
        }

        let list = state.mailing_list_mut(id)?;
        if !list.subscribers.iter().any(|s| s == email) {
            list.subscribers.push(email.to_string());
        }
        Ok(list.clone())
    }

    async fn unsubscribe(&self, id: &str, email: &str) -> Result<MailingList> {
        let mut state = self.begin(ApiCall::Unsubscribe {
            id: id.to_string(),
            email: email.to_string(),
        })?;

        let list = state.mailing_list_mut(id)?;
        list.subscribers.retain(|s| s != email);
        Ok(list.clone())
    }

    async fn send_to_mailing_list(&self, id: &str, message: &ListMessage) -> Result<()> {
        let mut state = self.begin(ApiCall::SendToMailingList {
            id: id.to_string(),
            message: message.clone(),
        })?;

        state.mailing_list_mut(id)?;
        state.list_messages.push((id.to_string(), message.clone()));
        Ok(())
    }
}
