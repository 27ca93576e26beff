//! シナリオテスト（ストア・ログは実装を注入）
