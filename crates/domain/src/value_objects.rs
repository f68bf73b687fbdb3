//! # 共通値オブジェクト
//!
//! 複数のモジュールで共有される値オブジェクトを定義する。
//!
//! ## 設計方針
//!
//! - **Newtype パターン**: プリミティブ型をラップし、型安全性を確保
//! - **バリデーション**: 生成時に検証し、不正な値の存在を型レベルで排除
//! - **不変性**: 一度作成したら変更不可
//!
//! ## 含まれる型
//!
//! | 型 | ラップ対象 | 用途 |
//! |---|-----------|------|
//! | [`UserName`] | `String` | ログイン名（セッション・トークン・履歴のキー） |

define_validated_string! {
    /// ユーザー名（値オブジェクト）
    ///
    /// ログイン時の識別子であり、分析履歴ストアのパーティションキーや
    /// レポートファイル名にも使用される。
    ///
    /// # 不変条件
    ///
    /// - 空文字列ではない（trim 後）
    /// - 最大 150 文字
    pub struct UserName {
        label: "username",
        max_length: 150,
    }
}
