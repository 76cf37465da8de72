use hashbrown::HashMap;
use parking_lot::Mutex;

/// One connected client, as tracked by the server for the `list` surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub client_name: String,
    pub ip: String,
    pub port: u16,
}

impl ClientInfo {
    /// Formats an entry the way the server CLI's `list` command prints it:
    /// `"<client_name>: <ip> <port>"`.
    pub fn display_line(&self) -> String {
        format!("{}: {} {}", self.client_name, self.ip, self.port)
    }
}

/// Tracks connected clients, keyed by an opaque connection id (not the
/// client name) so a worker can remove its own entry on disconnect without
/// racing a same-named reconnect.
///
/// One mutex guards the whole map; mutated by every worker thread on
/// accept/disconnect and read by the server command loop's `list` handler.
#[derive(Default)]
pub struct Registry {
    entries: Mutex<HashMap<u64, ClientInfo>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a newly accepted connection and assigns its client name:
    /// `"client_" + (current_size + 1)`. `connection_id` is a value unique
    /// to this connection (the worker's own incrementing counter is fine;
    /// it never needs to be guessed by a peer).
    pub fn add(&self, connection_id: u64, ip: String, port: u16) -> String {
        let mut entries = self.entries.lock();
        let client_name = format!("client_{}", entries.len() + 1);
        entries.insert(
            connection_id,
            ClientInfo {
                client_name: client_name.clone(),
                ip,
                port,
            },
        );
        client_name
    }

    /// Removes the entry for `connection_id`, on QUIT or disconnect.
    pub fn remove(&self, connection_id: u64) {
        self.entries.lock().remove(&connection_id);
    }

    /// Snapshot of every connected client's display line, in no particular
    /// order (the original keeps insertion order in a `Vec`; we don't
    /// promise that here since entries can now be removed out of order).
    pub fn list(&self) -> Vec<String> {
        self.entries
            .lock()
            .values()
            .map(ClientInfo::display_line)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
