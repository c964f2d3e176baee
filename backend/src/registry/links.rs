use crate::model::Network;

const TELEGRAM_PROFILE_BASE: &str = "https://web.telegram.org/a/#";

/// Telegram web profile link for a numeric user id. Does not validate the id.
pub fn derive_chat_link(chat_user_id: &str) -> String {
    format!("{TELEGRAM_PROFILE_BASE}{chat_user_id}")
}

pub fn explorer_link(network: Network, tx_hash: &str) -> String {
    format!("{}{}", network.explorer_tx_base(), tx_hash)
}

/// Explorer link for a free-text network name.
///
/// Unrecognised networks resolve against the Ethereum explorer instead of
/// failing. The hash is substituted verbatim.
pub fn derive_explorer_link(network: &str, tx_hash: &str) -> String {
    let network = network.parse().unwrap_or(Network::Ethereum);
    explorer_link(network, tx_hash)
}
