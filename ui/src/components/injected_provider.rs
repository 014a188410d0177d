//! EIP-1193 wallet provider injected by browser extensions as `window.ethereum`.
//!
//! Every call goes through `ethereum.request({ method, params })`, which returns a
//! promise. Errors carry a numeric `code`; 4001 means the user dismissed the prompt.

use eqiv_common::error::ProviderError;
use eqiv_common::identity::Address;
use eqiv_common::provider::WalletProvider;

/// EIP-1193: user rejected the request.
#[allow(dead_code)] // used in WASM builds
const USER_REJECTED: i64 = 4001;

/// Handle to the page's injected wallet.
pub struct InjectedProvider {
    #[cfg(target_family = "wasm")]
    ethereum: js_sys::Object,
    name: String,
}

impl InjectedProvider {
    /// Look for `window.ethereum`. Returns None when no wallet extension is installed.
    pub fn detect() -> Option<Self> {
        #[cfg(target_family = "wasm")]
        {
            let ethereum = wasm_impl::injected_ethereum()?;
            let name = if wasm_impl::flag(&ethereum, "isMetaMask") {
                "metamask"
            } else {
                "injected"
            };
            Some(Self {
                ethereum,
                name: name.to_string(),
            })
        }
        #[cfg(not(target_family = "wasm"))]
        {
            None
        }
    }
}

impl WalletProvider for InjectedProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        #[cfg(target_family = "wasm")]
        {
            let value = wasm_impl::request(&self.ethereum, "eth_requestAccounts", None::<()>)
                .await
                .map_err(|e| e.into_provider_error())?;
            let accounts: Vec<String> = serde_wasm_bindgen::from_value(value)
                .map_err(|e| ProviderError::Unavailable(format!("Parse accounts: {e}")))?;
            Ok(accounts.into_iter().map(Address::from).collect())
        }
        #[cfg(not(target_family = "wasm"))]
        {
            Err(ProviderError::Unavailable(
                "Injected provider only available in WASM".into(),
            ))
        }
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        #[cfg(target_family = "wasm")]
        {
            let value = wasm_impl::request(&self.ethereum, "eth_chainId", None::<()>)
                .await
                .map_err(|e| e.into_provider_error())?;
            value
                .as_string()
                .and_then(|raw| eqiv_common::provider::parse_chain_id(&raw))
                .or_else(|| value.as_f64().map(|n| n as u64))
                .ok_or_else(|| ProviderError::Unavailable(format!("Bad chain id: {value:?}")))
        }
        #[cfg(not(target_family = "wasm"))]
        {
            Err(ProviderError::Unavailable(
                "Injected provider only available in WASM".into(),
            ))
        }
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError> {
        #[cfg(target_family = "wasm")]
        {
            let params = [wasm_impl::SwitchChainParam {
                chain_id: eqiv_common::provider::chain_id_to_hex(chain_id),
            }];
            match wasm_impl::request(&self.ethereum, "wallet_switchEthereumChain", Some(params)).await {
                Ok(_) => Ok(()),
                Err(e) => Err(ProviderError::SwitchRejected {
                    chain_id,
                    reason: e.message,
                }),
            }
        }
        #[cfg(not(target_family = "wasm"))]
        {
            let _ = chain_id;
            Err(ProviderError::Unavailable(
                "Injected provider only available in WASM".into(),
            ))
        }
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}

// ─── WASM implementation ─────────────────────────────────────────────────────

#[cfg(target_family = "wasm")]
mod wasm_impl {
    use serde::Serialize;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    use eqiv_common::error::ProviderError;

    use super::USER_REJECTED;

    #[derive(Serialize)]
    struct RequestArguments<P: Serialize> {
        method: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        params: Option<P>,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SwitchChainParam {
        pub chain_id: String,
    }

    /// Error object rejected by `ethereum.request`.
    pub struct RpcError {
        pub code: Option<i64>,
        pub message: String,
    }

    impl RpcError {
        fn msg(message: &str) -> Self {
            Self {
                code: None,
                message: message.to_string(),
            }
        }

        fn from_js(err: JsValue) -> Self {
            let code = js_sys::Reflect::get(&err, &"code".into())
                .ok()
                .and_then(|c| c.as_f64())
                .map(|c| c as i64);
            let message = js_sys::Reflect::get(&err, &"message".into())
                .ok()
                .and_then(|m| m.as_string())
                .unwrap_or_else(|| format!("{err:?}"));
            Self { code, message }
        }

        pub fn into_provider_error(self) -> ProviderError {
            if self.code == Some(USER_REJECTED) {
                ProviderError::Rejected(self.message)
            } else {
                ProviderError::Unavailable(self.message)
            }
        }
    }

    pub fn injected_ethereum() -> Option<js_sys::Object> {
        let window = web_sys::window()?;
        let value = js_sys::Reflect::get(&window, &"ethereum".into()).ok()?;
        if value.is_undefined() || value.is_null() {
            return None;
        }
        value.dyn_into::<js_sys::Object>().ok()
    }

    pub fn flag(target: &js_sys::Object, name: &str) -> bool {
        js_sys::Reflect::get(target, &JsValue::from_str(name))
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub async fn request<P: Serialize>(
        ethereum: &js_sys::Object,
        method: &'static str,
        params: Option<P>,
    ) -> Result<JsValue, RpcError> {
        let args = serde_wasm_bindgen::to_value(&RequestArguments { method, params })
            .map_err(|e| RpcError::msg(&format!("Serialize {method}: {e}")))?;

        let request_fn: js_sys::Function = js_sys::Reflect::get(ethereum, &"request".into())
            .map_err(RpcError::from_js)?
            .dyn_into()
            .map_err(|_| RpcError::msg("Provider has no request()"))?;

        let promise: js_sys::Promise = request_fn
            .call1(ethereum, &args)
            .map_err(RpcError::from_js)?
            .dyn_into()
            .map_err(|_| RpcError::msg("request() did not return a promise"))?;

        JsFuture::from(promise).await.map_err(RpcError::from_js)
    }
}
