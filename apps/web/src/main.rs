//! # SymptoCare Web サーバー
//!
//! 症状分析ポータルの Web アプリケーションサーバー。
//!
//! ## 役割
//!
//! ブラウザ向けのセッション認証ルートと、外部クライアント向けの
//! ベアラートークン認証 API を 1 つのバイナリで提供する:
//!
//! - **認証・セッション管理**: HTTPOnly Cookie によるセッション管理
//! - **症状分析パイプライン**: Lambda 呼び出し → 通知 → キュー中継 →
//!   PDF レポート生成 → S3 アップロード → DynamoDB 履歴追記
//! - **記録管理**: アレルギー・栄養欠乏症レコードの CRUD
//! - **購読管理**: SNS トピックへのメール・SMS 購読
//!
//! ## アーキテクチャ
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   Browser    │────▶│     Web      │────▶│  PostgreSQL  │
//! │  API Client  │     │  port: 8000  │     │ (ユーザー等) │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!                             │
//!                             ├──▶ Redis（セッション）
//!                             ├──▶ Lambda（症状分析）
//!                             ├──▶ SQS（分析結果の中継）
//!                             ├──▶ SNS（アラート・購読）
//!                             ├──▶ S3（レポート PDF）
//!                             └──▶ DynamoDB（分析履歴）
//! ```
//!
//! ## 環境変数
//!
//! ポート番号などは `.env` ファイルで設定する（`.env.example` を参照）。
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `WEB_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `WEB_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `REDIS_URL` | **Yes** | Redis 接続 URL |
//! | `AWS_ENDPOINT_URL` | No | AWS エンドポイント（LocalStack 用） |
//! | `REPORT_BUCKET_NAME` | **Yes** | レポート PDF の S3 バケット名 |
//! | `ANALYSIS_FUNCTION_NAME` | **Yes** | 症状分析 Lambda 関数名 |
//! | `ANALYSIS_QUEUE_URL` | **Yes** | 分析結果中継の SQS キュー URL |
//! | `ALERT_TOPIC_ARN` | No | アラート通知の SNS トピック ARN |
//! | `ANALYSIS_HISTORY_TABLE` | No | 分析履歴の DynamoDB テーブル名 |
//! | `ANALYSIS_TIMEOUT_SECS` | No | 分析呼び出しのタイムアウト秒数 |
//! | `ENV` | No | `production` で Cookie に Secure を付与 |
//! | `LOG_FORMAT` | No | `json` または `pretty` |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（.env ファイルを使用）
//! cargo run -p symptocare-web
//!
//! # 本番環境（環境変数を直接指定）
//! WEB_PORT=8000 DATABASE_URL=postgres://... cargo run -p symptocare-web --release
//! ```

mod config;
mod error;
mod handler;
mod middleware;
mod usecase;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use config::AppConfig;
use handler::{
    AllergyState,
    AuthState,
    DashboardState,
    DeficiencyState,
    ProfileState,
    ReadinessState,
    SubscriptionState,
    SymptomState,
    analyze_symptoms,
    api_login,
    confirm_delete_allergy,
    confirm_delete_deficiency,
    create_allergy,
    create_deficiency,
    delete_allergy,
    delete_deficiency,
    get_allergy,
    get_deficiency,
    get_history,
    get_profile,
    get_subscription_prompt,
    health_check,
    list_allergies,
    list_deficiencies,
    login,
    logout,
    protected_check,
    readiness_check,
    register,
    show_dashboard,
    submit_symptoms,
    subscribe,
    update_allergy,
    update_deficiency,
    update_profile,
};
use middleware::{SessionAuthState, TokenAuthState, require_session, require_token};
use redis::aio::ConnectionManager;
use symptocare_domain::clock::{Clock, SystemClock};
use symptocare_infra::{
    Argon2PasswordHasher,
    PasswordHasher,
    RedisSessionManager,
    SessionManager,
    aws,
    db,
    dynamodb,
    lambda::{self, AnalysisInvoker, LambdaAnalysisClient},
    report::{PdfReportRenderer, ReportRenderer},
    repository::{
        AllergyRepository,
        DeficiencyRepository,
        DynamoDbHistoryRepository,
        HistoryRepository,
        PostgresAllergyRepository,
        PostgresDeficiencyRepository,
        PostgresProfileRepository,
        PostgresTokenRepository,
        PostgresUserRepository,
        ProfileRepository,
        TokenRepository,
        UserRepository,
    },
    s3::{self, ReportStorage, S3ReportStorage},
    sns::{self, NoopNotificationPublisher, NotificationPublisher, SnsNotificationPublisher},
    sqs::{self, MessageQueue, SqsMessageQueue},
};
use symptocare_shared::observability::{MakeRequestUuidV7, TracingConfig, make_request_span};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use usecase::{
    AllergyUseCaseImpl,
    AuthUseCaseImpl,
    DeficiencyUseCaseImpl,
    ProfileUseCaseImpl,
    SubmissionUseCaseImpl,
    SubscriptionUseCaseImpl,
    SymptomUseCaseImpl,
};

/// Web サーバーのエントリーポイント
///
/// 以下の順序で初期化を行う:
///
/// 1. 環境変数の読み込み（.env ファイル）
/// 2. トレーシングの初期化
/// 3. アプリケーション設定の読み込み
/// 4. データベース・Redis・AWS クライアントの初期化
/// 5. ルーターの構築
/// 6. HTTP サーバーの起動
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    // 本番環境では .env ファイルは使用せず、環境変数を直接設定する
    dotenvy::dotenv().ok();

    // トレーシング初期化
    let tracing_config = TracingConfig::from_env("web");
    symptocare_shared::observability::init_tracing(tracing_config);
    let _tracing_guard = tracing::info_span!("app", service = "web").entered();

    // 設定読み込み
    let config = AppConfig::from_env().expect("設定の読み込みに失敗しました");

    tracing::info!("Web サーバーを起動します: {}:{}", config.host, config.port);

    // データベース接続とマイグレーション
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("データベースへの接続に失敗しました");
    db::run_migrations(&pool)
        .await
        .expect("マイグレーションの実行に失敗しました");

    // Redis 接続（セッションストアと Readiness Check で共有）
    let redis_client =
        redis::Client::open(config.redis_url.as_str()).expect("REDIS_URL が不正です");
    let redis_conn = ConnectionManager::new(redis_client)
        .await
        .expect("Redis への接続に失敗しました");
    let session_manager: Arc<dyn SessionManager> =
        Arc::new(RedisSessionManager::from_connection(redis_conn.clone()));

    // AWS クライアントの初期化
    let aws_config = aws::load_config(config.aws_endpoint_url.as_deref()).await;
    let analysis_invoker: Arc<dyn AnalysisInvoker> = Arc::new(LambdaAnalysisClient::new(
        lambda::create_client(&aws_config),
        config.analysis_function_name.clone(),
    ));
    let message_queue: Arc<dyn MessageQueue> = Arc::new(SqsMessageQueue::new(
        sqs::create_client(&aws_config),
        config.analysis_queue_url.clone(),
    ));
    let report_storage: Arc<dyn ReportStorage> = Arc::new(S3ReportStorage::new(
        s3::create_client(&aws_config, config.aws_endpoint_url.is_some()),
        config.report_bucket_name.clone(),
    ));
    let notification_publisher: Arc<dyn NotificationPublisher> = match &config.alert_topic_arn {
        Some(topic_arn) => Arc::new(SnsNotificationPublisher::new(
            sns::create_client(&aws_config),
            topic_arn.clone(),
        )),
        None => {
            tracing::warn!("ALERT_TOPIC_ARN が未設定のため、アラート通知をスキップします");
            Arc::new(NoopNotificationPublisher)
        }
    };

    // DynamoDB クライアントの初期化（分析履歴テーブル）
    let dynamodb_client = dynamodb::create_client(&aws_config);
    dynamodb::ensure_history_table(&dynamodb_client, &config.analysis_history_table)
        .await
        .expect("DynamoDB 分析履歴テーブルのセットアップに失敗しました");
    let history_repository: Arc<dyn HistoryRepository> = Arc::new(DynamoDbHistoryRepository::new(
        dynamodb_client,
        config.analysis_history_table.clone(),
    ));

    // リポジトリとドメインサービスの初期化
    // 具象型で保持し、各 State 注入時に必要なトレイトオブジェクトへ coerce する
    let user_repository: Arc<dyn UserRepository> =
        Arc::new(PostgresUserRepository::new(pool.clone()));
    let profile_repository: Arc<dyn ProfileRepository> =
        Arc::new(PostgresProfileRepository::new(pool.clone()));
    let allergy_repository: Arc<dyn AllergyRepository> =
        Arc::new(PostgresAllergyRepository::new(pool.clone()));
    let deficiency_repository: Arc<dyn DeficiencyRepository> =
        Arc::new(PostgresDeficiencyRepository::new(pool.clone()));
    let token_repository: Arc<dyn TokenRepository> =
        Arc::new(PostgresTokenRepository::new(pool.clone()));
    let password_hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new());
    let report_renderer: Arc<dyn ReportRenderer> = Arc::new(PdfReportRenderer::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // ユースケースと State の初期化
    let auth_state = Arc::new(AuthState {
        usecase:        Arc::new(AuthUseCaseImpl::new(
            user_repository,
            token_repository.clone(),
            session_manager.clone(),
            password_hasher,
            clock.clone(),
        )),
        secure_cookies: config.is_production(),
    });
    let dashboard_state = Arc::new(DashboardState {
        usecase: Arc::new(SubmissionUseCaseImpl::new(
            profile_repository.clone(),
            history_repository,
            analysis_invoker.clone(),
            message_queue,
            notification_publisher.clone(),
            report_storage,
            report_renderer,
            clock.clone(),
            config.analysis_timeout,
        )),
    });
    let profile_state = Arc::new(ProfileState {
        usecase: Arc::new(ProfileUseCaseImpl::new(
            profile_repository,
            analysis_invoker.clone(),
            clock.clone(),
            config.analysis_timeout,
        )),
    });
    let symptom_state = Arc::new(SymptomState {
        usecase: Arc::new(SymptomUseCaseImpl::new(
            analysis_invoker,
            config.analysis_timeout,
        )),
    });
    let allergy_state = Arc::new(AllergyState {
        usecase: Arc::new(AllergyUseCaseImpl::new(allergy_repository, clock.clone())),
    });
    let deficiency_state = Arc::new(DeficiencyState {
        usecase: Arc::new(DeficiencyUseCaseImpl::new(deficiency_repository, clock)),
    });
    let subscription_state = Arc::new(SubscriptionState {
        usecase: Arc::new(SubscriptionUseCaseImpl::new(notification_publisher)),
    });
    let readiness_state = Arc::new(ReadinessState {
        pool,
        redis_conn,
    });

    // 認証ミドルウェア用の状態
    let session_auth_state = SessionAuthState {
        session_manager: session_manager.clone(),
    };
    let token_auth_state = TokenAuthState {
        token_repository,
    };

    // ルーター構築
    // Request ID + TraceLayer により、すべての HTTP リクエストに request_id が付与されログに自動注入される
    let app = Router::new()
        // 公開ルート（認証なし）
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .with_state(readiness_state)
        .merge(
            Router::new()
                .route("/auth/register", post(register))
                .route("/auth/login", post(login))
                .route("/api/login", post(api_login))
                .with_state(auth_state.clone()),
        )
        // セッション認証ルート（ブラウザ向け）
        .merge(
            Router::new()
                .route("/auth/logout", post(logout))
                .with_state(auth_state)
                .merge(
                    Router::new()
                        .route("/dashboard", get(show_dashboard).post(submit_symptoms))
                        .with_state(dashboard_state.clone()),
                )
                .merge(
                    Router::new()
                        .route("/allergies", get(list_allergies).post(create_allergy))
                        .route("/allergies/{id}", get(get_allergy).put(update_allergy))
                        .route(
                            "/allergies/{id}/delete",
                            get(confirm_delete_allergy).post(delete_allergy),
                        )
                        .with_state(allergy_state.clone()),
                )
                .merge(
                    Router::new()
                        .route(
                            "/deficiencies",
                            get(list_deficiencies).post(create_deficiency),
                        )
                        .route(
                            "/deficiencies/{id}",
                            get(get_deficiency).put(update_deficiency),
                        )
                        .route(
                            "/deficiencies/{id}/delete",
                            get(confirm_delete_deficiency).post(delete_deficiency),
                        )
                        .with_state(deficiency_state.clone()),
                )
                .merge(
                    Router::new()
                        .route("/subscribe", get(get_subscription_prompt).post(subscribe))
                        .with_state(subscription_state),
                )
                .layer(from_fn_with_state(session_auth_state, require_session)),
        )
        // ベアラートークン認証ルート（API クライアント向け）
        .merge(
            Router::new()
                .route("/api/profile", get(get_profile).post(update_profile))
                .with_state(profile_state)
                .merge(
                    Router::new()
                        .route("/api/symptoms", post(analyze_symptoms))
                        .with_state(symptom_state),
                )
                .merge(
                    Router::new()
                        .route("/api/history", get(get_history))
                        .with_state(dashboard_state),
                )
                .merge(
                    Router::new()
                        .route("/api/allergies", get(list_allergies).post(create_allergy))
                        .with_state(allergy_state),
                )
                .merge(
                    Router::new()
                        .route(
                            "/api/deficiencies",
                            get(list_deficiencies).post(create_deficiency),
                        )
                        .with_state(deficiency_state),
                )
                .route("/api/protected", get(protected_check))
                .layer(from_fn_with_state(token_auth_state, require_token)),
        )
        // Request ID レイヤー（レイヤー順序が重要: 下に書いたものが外側）
        // 1. SetRequestIdLayer（最外）: リクエスト受信時に UUID v7 を生成（またはクライアント提供値を使用）
        // 2. TraceLayer: カスタムスパンに request_id を含め、全ログに自動注入
        // 3. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("アドレスのパースに失敗しました");

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Web サーバーが起動しました: {}", addr);

    // Graceful shutdown は axum::serve が自動的に処理する
    axum::serve(listener, app).await?;

    Ok(())
}
