use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Поля, которые Telegram кодирует как вложенный JSON. Декодируются
/// только ПОСЛЕ проверки подписи — подпись считается по сырым строкам.
const JSON_FIELDS: [&str; 3] = ["user", "receiver", "chat"];

/// Ошибка валидации initData.
///
/// Непрозрачная по построению: парсинг, отсутствующий hash и неверная
/// подпись неразличимы для вызывающего кода.
#[derive(Debug, Error)]
#[error("invalid init data")]
pub struct InitDataError;

/// Проверенные поля initData (все, кроме `hash`).
///
/// Обычные поля хранятся как `Value::String`; `user` / `receiver` /
/// `chat` — как декодированный JSON, либо как исходная строка, если
/// декодирование не удалось.
#[derive(Debug, Clone)]
pub struct InitData {
    fields: HashMap<String, Value>,
}

impl InitData {
    /// Возвращает значение поля по имени.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Возвращает строковое поле (None для JSON-декодированных полей).
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }

    /// Извлекает user_id из декодированного поля `user`.
    ///
    /// Требует объект с целочисленным (или приводимым к целому) `id`.
    /// `None` — это отказ авторизации, отличный от ошибки подписи,
    /// но наружу оба отдаются одинаково.
    pub fn user_id(&self) -> Option<i64> {
        let id = self.fields.get("user")?.as_object()?.get("id")?;
        match id {
            Value::Number(n) => n.as_i64(),
            // int("123") в оригинале принимает и строку
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Валидация Telegram Web App init data.
///
/// Telegram подписывает данные с помощью HMAC-SHA256. Ключ для HMAC
/// создаётся из bot token: HMAC_SHA256("WebAppData", bot_token),
/// затем подпись считается по check string — все поля кроме `hash`,
/// отсортированные по ключу, в виде строк `key=value` через `\n`.
///
/// # Аргументы
/// * `raw` - строка initData из `window.Telegram.WebApp.initData`
///   (query string format)
/// * `bot_token` - токен бота
///
/// # Возвращает
/// `Ok(InitData)` если подпись сходится, иначе `Err(InitDataError)`.
/// Любое отклонение от протокола (нет `hash`, битая подпись, пустой
/// токен) даёт один и тот же непрозрачный отказ.
pub fn verify(raw: &str, bot_token: &str) -> Result<InitData, InitDataError> {
    if raw.is_empty() || bot_token.is_empty() {
        return Err(InitDataError);
    }

    // Разбор query string. При повторе ключа учитывается только первое
    // вхождение; пары с пустым значением отбрасываются (семантика
    // urllib.parse.parse_qs, по которой данные и подписывались).
    let mut params: BTreeMap<String, String> = BTreeMap::new();
    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }

    let received_hash = params.get("hash").ok_or(InitDataError)?.clone();

    // Check string: все поля кроме hash, в лексикографическом порядке
    // ключей (BTreeMap), без завершающего перевода строки.
    let data_check_string = params
        .iter()
        .filter(|(key, _)| key.as_str() != "hash")
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("\n");

    // Секретный ключ: HMAC_SHA256("WebAppData", bot_token)
    let mut secret_key_mac = HmacSha256::new_from_slice(b"WebAppData").map_err(|_| InitDataError)?;
    secret_key_mac.update(bot_token.as_bytes());
    let secret_key = secret_key_mac.finalize().into_bytes();

    // Подпись check string; сравнение через Mac::verify_slice —
    // константное время, никаких ранних выходов по первому байту.
    let mut mac = HmacSha256::new_from_slice(&secret_key).map_err(|_| InitDataError)?;
    mac.update(data_check_string.as_bytes());
    let received = hex::decode(received_hash.as_bytes()).map_err(|_| InitDataError)?;
    mac.verify_slice(&received).map_err(|_| InitDataError)?;

    // Подпись сошлась — декодируем JSON-поля. Ошибка декодирования
    // отдельного поля не роняет проверку: остаётся сырая строка.
    let fields = params
        .into_iter()
        .filter(|(key, _)| key != "hash")
        .map(|(key, value)| {
            let decoded = if JSON_FIELDS.contains(&key.as_str()) {
                match serde_json::from_str::<Value>(&value) {
                    Ok(json) => json,
                    Err(_) => Value::String(value),
                }
            } else {
                Value::String(value)
            };
            (key, decoded)
        })
        .collect();

    Ok(InitData { fields })
}
