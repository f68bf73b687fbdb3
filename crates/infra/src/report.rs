//! # PDF レポート生成
//!
//! 分析結果のレポート PDF をメモリ上で生成する。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `ReportRenderer` trait で生成処理を抽象化
//! - **レイアウト**: A4 縦 1 ページ、タイトル行とキー/値の行を上から配置
//! - **生成失敗は致命的**: 分析パイプラインで唯一、エラーをリクエスト失敗と
//!   して伝播させる工程

use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::InfraError;

/// タイトル行の Y 座標（A4 縦 297mm の上端付近）
const TITLE_Y_MM: f32 = 270.0;

/// 本文 1 行目の Y 座標
const BODY_START_Y_MM: f32 = 250.0;

/// 本文の行送り
const LINE_HEIGHT_MM: f32 = 10.0;

/// レポート生成のインターフェース
pub trait ReportRenderer: Send + Sync {
    /// タイトルとキー/値の行から PDF を生成する
    fn render(&self, title: &str, lines: &[(String, String)]) -> Result<Vec<u8>, InfraError>;
}

/// printpdf によるレポート生成
#[derive(Debug, Clone, Default)]
pub struct PdfReportRenderer;

impl PdfReportRenderer {
    /// 新しいレポート生成を作成する
    pub fn new() -> Self {
        Self
    }
}

impl ReportRenderer for PdfReportRenderer {
    fn render(&self, title: &str, lines: &[(String, String)]) -> Result<Vec<u8>, InfraError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(210.0), Mm(297.0), "Layer 1");

        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| InfraError::report(format!("フォントの読み込みに失敗: {e}")))?;

        let current_layer = doc.get_page(page).get_layer(layer);
        current_layer.use_text(title, 16.0, Mm(20.0), Mm(TITLE_Y_MM), &font);

        for (index, (key, value)) in lines.iter().enumerate() {
            let y = BODY_START_Y_MM - LINE_HEIGHT_MM * index as f32;
            current_layer.use_text(format!("{key}: {value}"), 12.0, Mm(20.0), Mm(y), &font);
        }

        doc.save_to_bytes()
            .map_err(|e| InfraError::report(format!("PDF の書き出しに失敗: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn 生成したpdfがマジックナンバーで始まる() {
        let renderer = PdfReportRenderer::new();
        let lines = vec![
            ("conditions".to_string(), "Flu, Cold".to_string()),
            ("severity".to_string(), "Mild".to_string()),
            ("recommendation".to_string(), "Rest".to_string()),
        ];

        let bytes = renderer.render("Report for alice", &lines).unwrap();

        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn 行が空でも生成できる() {
        let renderer = PdfReportRenderer::new();

        let bytes = renderer.render("Report for alice", &[]).unwrap();

        assert!(!bytes.is_empty());
    }
}
