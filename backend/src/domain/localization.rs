//! Localized user-facing strings.
//!
//! A two-level lookup (language → key → text) with a fixed fallback chain:
//! the requested language, then the default language, then the key itself.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const DEFAULT_LANGUAGE: &str = "id";

type Table = HashMap<&'static str, &'static str>;

const ID_STRINGS: &[(&str, &str)] = &[
    ("app_name", "Pengelola Keuangan Pribadi"),
    ("pemasukan", "Pemasukan"),
    ("pengeluaran", "Pengeluaran"),
    ("date", "Tanggal"),
    ("category", "Kategori"),
    ("note", "Catatan"),
    ("amount", "Jumlah"),
    ("weekly", "Mingguan"),
    ("monthly", "Bulanan"),
    ("status_free", "Status: Gratis"),
    ("status_premium", "Status: Premium"),
    ("fill_all_fields", "Isi semua field!"),
    ("error", "Kesalahan"),
    ("success", "Sukses"),
    ("register_success", "Registrasi berhasil"),
    ("login_success", "Login berhasil"),
    ("logout_success", "Anda telah keluar"),
    ("user_exists", "Nama pengguna sudah terdaftar"),
    ("login_failed", "Nama pengguna atau kata sandi salah"),
    ("no_user_logged_in", "Tidak ada user yang login"),
    ("upgrade_success", "Selamat! Anda telah menjadi pengguna premium."),
    ("transaction_saved", "Transaksi berhasil disimpan"),
    ("transaction_deleted", "Transaksi dihapus"),
    ("cannot_delete", "Tidak dapat menghapus transaksi"),
    ("no_transactions", "Belum ada transaksi"),
    ("no_transactions_this_month", "Tidak ada transaksi bulan ini"),
    ("premium_only", "Hanya untuk Premium"),
    ("premium_feature_only", "Fitur ini hanya untuk pengguna Premium"),
    ("pdf_generated", "PDF berhasil dibuat"),
    ("user_not_found", "User tidak ditemukan"),
    ("username_required", "Username wajib diberikan"),
    ("invalid_input", "Masukan tidak valid"),
    ("enter_number", "Masukkan angka"),
    ("gateway_error", "Pembayaran gagal"),
    ("storage_error", "Gagal menyimpan data"),
    ("payment_pending", "Transaksi belum selesai atau tidak valid"),
    ("user_upgraded", "Pengguna berhasil ditingkatkan ke premium"),
    ("total_expense", "Total Pengeluaran"),
    ("balance", "Saldo"),
    ("report_title", "Laporan Keuangan Bulanan"),
    ("report_user", "User"),
    ("report_period", "Periode"),
    ("report_monthly_total", "Total Bulanan"),
    ("report_weekly_total", "Total Mingguan"),
    ("report_breakdown", "Rincian Pengeluaran:"),
    ("report_signature", "Ditandatangani secara digital oleh FinanceTracker"),
    ("chart_categories", "Pengeluaran Bulanan per Kategori"),
    ("chart_daily", "Pengeluaran Harian"),
    ("report_generated", "Dibuat pada"),
];

const EN_STRINGS: &[(&str, &str)] = &[
    ("app_name", "Personal Finance Tracker"),
    ("pemasukan", "Income"),
    ("pengeluaran", "Expense"),
    ("date", "Date"),
    ("category", "Category"),
    ("note", "Note"),
    ("amount", "Amount"),
    ("weekly", "Weekly"),
    ("monthly", "Monthly"),
    ("status_free", "Status: Free"),
    ("status_premium", "Status: Premium"),
    ("fill_all_fields", "Fill all fields!"),
    ("error", "Error"),
    ("success", "Success"),
    ("register_success", "Registration successful"),
    ("login_success", "Login successful"),
    ("logout_success", "You have been logged out"),
    ("user_exists", "Username already exists"),
    ("login_failed", "Invalid username or password"),
    ("no_user_logged_in", "No user is logged in"),
    ("upgrade_success", "Congratulations! You are now a premium user."),
    ("transaction_saved", "Transaction saved successfully"),
    ("transaction_deleted", "Transaction deleted"),
    ("cannot_delete", "Cannot delete transaction"),
    ("no_transactions", "No transactions yet"),
    ("no_transactions_this_month", "No transactions this month"),
    ("premium_only", "Premium Only"),
    ("premium_feature_only", "This feature is only for Premium users"),
    ("pdf_generated", "PDF generated successfully"),
    ("user_not_found", "User not found"),
    ("username_required", "Username is required"),
    ("invalid_input", "Invalid input"),
    ("enter_number", "Enter a number"),
    ("gateway_error", "Payment failed"),
    ("storage_error", "Failed to save data"),
    ("payment_pending", "Transaction not completed or invalid"),
    ("user_upgraded", "User upgraded to premium"),
    ("total_expense", "Total Expense"),
    ("balance", "Balance"),
    ("report_title", "Monthly Financial Report"),
    ("report_user", "User"),
    ("report_period", "Period"),
    ("report_monthly_total", "Monthly Total"),
    ("report_weekly_total", "Weekly Total"),
    ("report_breakdown", "Expense Breakdown:"),
    ("report_signature", "Digitally signed by FinanceTracker"),
    ("chart_categories", "Monthly Spending by Category"),
    ("chart_daily", "Daily Spending"),
    ("report_generated", "Generated on"),
];

static LANGUAGES: Lazy<HashMap<&'static str, Table>> = Lazy::new(|| {
    let mut languages = HashMap::new();
    languages.insert("id", ID_STRINGS.iter().copied().collect::<Table>());
    languages.insert("en", EN_STRINGS.iter().copied().collect::<Table>());
    languages
});

/// Resolves translation keys for a configured default language
#[derive(Debug, Clone)]
pub struct Localizer {
    default_language: &'static str,
}

impl Default for Localizer {
    fn default() -> Self {
        Self {
            default_language: DEFAULT_LANGUAGE,
        }
    }
}

impl Localizer {
    /// Create a localizer; an unsupported default falls back to `id`
    pub fn new(default_language: &str) -> Self {
        Self {
            default_language: Self::supported(default_language).unwrap_or(DEFAULT_LANGUAGE),
        }
    }

    pub fn default_language(&self) -> &'static str {
        self.default_language
    }

    /// Normalize a language tag (`en-US`, `EN`) to a supported code
    pub fn supported(language: &str) -> Option<&'static str> {
        let primary = language
            .split(|c| c == '-' || c == '_')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        LANGUAGES.keys().find(|code| **code == primary).copied()
    }

    /// Pick the language for a request: the first supported entry of an
    /// `Accept-Language` style list, or the default
    pub fn resolve(&self, requested: Option<&str>) -> &'static str {
        requested
            .into_iter()
            .flat_map(|value| value.split(','))
            .map(|entry| entry.split(';').next().unwrap_or(""))
            .find_map(Self::supported)
            .unwrap_or(self.default_language)
    }

    /// Translate `key`: requested language, then default language, then the key itself
    pub fn translate(&self, language: &str, key: &str) -> String {
        if key.is_empty() {
            return String::new();
        }
        let lookup = |code: &str| LANGUAGES.get(code).and_then(|table| table.get(key)).copied();

        Self::supported(language)
            .and_then(lookup)
            .or_else(|| lookup(self.default_language))
            .unwrap_or(key)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_requested_language() {
        let localizer = Localizer::default();
        assert_eq!(localizer.translate("en", "balance"), "Balance");
        assert_eq!(localizer.translate("id", "balance"), "Saldo");
    }

    #[test]
    fn test_unknown_language_falls_back_to_default() {
        let localizer = Localizer::default();
        assert_eq!(localizer.translate("fr", "balance"), "Saldo");
    }

    #[test]
    fn test_unknown_key_falls_back_to_key() {
        let localizer = Localizer::new("en");
        assert_eq!(localizer.translate("en", "does_not_exist"), "does_not_exist");
        assert_eq!(localizer.translate("en", ""), "");
    }

    #[test]
    fn test_resolve_accept_language() {
        let localizer = Localizer::default();
        assert_eq!(localizer.resolve(Some("en-US,en;q=0.9")), "en");
        assert_eq!(localizer.resolve(Some("fr-FR, id;q=0.5")), "id");
        assert_eq!(localizer.resolve(Some("de")), "id");
        assert_eq!(localizer.resolve(None), "id");
    }

    #[test]
    fn test_unsupported_default_uses_id() {
        assert_eq!(Localizer::new("xx").default_language(), "id");
        assert_eq!(Localizer::new("EN").default_language(), "en");
    }

    #[test]
    fn test_status_messages_are_translated() {
        let localizer = Localizer::default();
        for key in ["user_upgraded", "upgrade_success", "payment_pending", "user_not_found"] {
            assert_ne!(localizer.translate("id", key), localizer.translate("en", key), "{}", key);
        }
        assert_eq!(
            localizer.translate("id", "user_upgraded"),
            "Pengguna berhasil ditingkatkan ke premium"
        );
    }

    #[test]
    fn test_tables_have_the_same_keys() {
        let id: Vec<&str> = ID_STRINGS.iter().map(|(k, _)| *k).collect();
        let en: Vec<&str> = EN_STRINGS.iter().map(|(k, _)| *k).collect();
        assert_eq!(id, en);
    }
}
