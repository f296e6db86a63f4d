//! Traits for voucher renderer standardization.

use super::settings::VoucherSettings;
use super::{RenderedDocument, Voucher, VoucherError};

/// An output format a voucher can be rendered to.
pub trait VoucherRenderer {
    /// Render one non-empty voucher.
    fn render(
        &self,
        voucher: &Voucher<'_>,
        settings: &VoucherSettings,
    ) -> Result<RenderedDocument, VoucherError>;
}
